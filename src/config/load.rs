use std::{env, path::PathBuf};

use ratatui::style::Color;

use super::schema::Settings;

const MAX_TICK_MS: u64 = 10_000;
const MAX_POLL_INTERVAL_MS: u64 = 3_600_000;
const MAX_CALLBACK_TIMEOUT_SECS: u64 = 3_600;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `TUNECARD__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TUNECARD")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let o = &self.overlay;
        if !(0.0..=1.0).contains(&o.opacity) {
            return Err("overlay.opacity must be between 0.0 and 1.0".to_string());
        }
        if !(o.fade_step > 0.0 && o.fade_step <= 1.0) {
            return Err("overlay.fade_step must be > 0.0 and <= 1.0".to_string());
        }
        for (name, ms) in [
            ("fade_tick_ms", o.fade_tick_ms),
            ("scroll_tick_ms", o.scroll_tick_ms),
            ("progress_tick_ms", o.progress_tick_ms),
        ] {
            if !(1..=MAX_TICK_MS).contains(&ms) {
                return Err(format!("overlay.{name} must be between 1 and {MAX_TICK_MS}"));
            }
        }
        if o.width < 20 || o.height < 4 {
            return Err("overlay card must be at least 20x4 cells".to_string());
        }
        if !(100..=MAX_POLL_INTERVAL_MS).contains(&self.source.poll_interval_ms) {
            return Err(format!(
                "source.poll_interval_ms must be between 100 and {MAX_POLL_INTERVAL_MS}"
            ));
        }
        if !(1..=MAX_CALLBACK_TIMEOUT_SECS).contains(&self.spotify.callback_timeout_secs) {
            return Err(format!(
                "spotify.callback_timeout_secs must be between 1 and {MAX_CALLBACK_TIMEOUT_SECS}"
            ));
        }
        let a = &self.appearance;
        for (name, value) in [
            ("progress_color", &a.progress_color),
            ("track_color", &a.track_color),
            ("artist_color", &a.artist_color),
            ("time_color", &a.time_color),
        ] {
            if value.parse::<Color>().is_err() {
                return Err(format!("appearance.{name}: unknown colour {value:?}"));
            }
        }
        Ok(())
    }
}

/// Resolve the config path from `TUNECARD_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TUNECARD_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tunecard/config.toml`
/// or `~/.config/tunecard/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tunecard").join("config.toml"))
}
