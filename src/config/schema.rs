use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tunecard/config.toml` or `~/.config/tunecard/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TUNECARD__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub spotify: SpotifySettings,
    pub source: SourceSettings,
    pub overlay: OverlaySettings,
    pub appearance: AppearanceSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    /// Application client id from the Spotify developer dashboard.
    pub client_id: String,
    pub client_secret: String,
    /// Must match a redirect URI registered for the application.
    pub redirect_uri: String,
    pub scope: String,
    /// How long to wait for the browser to hit the redirect URI (seconds).
    pub callback_timeout_secs: u64,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            scope: "user-read-currently-playing user-read-playback-state".to_string(),
            callback_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Spotify Web API, authorized through the browser.
    #[default]
    Spotify,
    /// A local media player over the D-Bus session bus.
    #[serde(alias = "dbus")]
    Mpris,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// How often to ask the source for a fresh snapshot (milliseconds).
    pub poll_interval_ms: u64,
    /// Bus name suffix of the player to follow when `kind = "mpris"`.
    pub mpris_player: String,
    /// Whether to download and draw cover art.
    pub artwork: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Spotify,
            poll_interval_ms: 2000,
            mpris_player: "spotify".to_string(),
            artwork: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Opacity the card fades in to (0.0 - 1.0).
    pub opacity: f32,
    /// Opacity change per fade tick.
    pub fade_step: f32,
    pub fade_tick_ms: u64,
    pub scroll_tick_ms: u64,
    pub progress_tick_ms: u64,
    /// Characters shown before a line starts to scroll.
    pub max_text_length: usize,
    /// Card size in terminal cells.
    pub width: u16,
    pub height: u16,
    /// Column of the card's left edge; negative centres it.
    pub position_x: i32,
    /// Rows between the card and the bottom of the terminal.
    pub position_y_from_bottom: u16,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            opacity: 0.85,
            fade_step: 0.05,
            fade_tick_ms: 20,
            scroll_tick_ms: 150,
            progress_tick_ms: 100,
            max_text_length: 35,
            width: 64,
            height: 8,
            position_x: -1,
            position_y_from_bottom: 2,
        }
    }
}

/// Colours accept anything ratatui parses: names (`white`) or `#rrggbb`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppearanceSettings {
    pub progress_color: String,
    pub track_color: String,
    pub artist_color: String,
    pub time_color: String,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            progress_color: "#1DB954".to_string(),
            track_color: "white".to_string(),
            artist_color: "#b3b3b3".to_string(),
            time_color: "#b3b3b3".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file path. Defaults to `tunecard.log` in the temp directory.
    pub file: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    pub fn log_file(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("tunecard.log"))
    }
}
