use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::auth::{self, Credentials};
use crate::config::{Settings, SourceKind};
use crate::source::{ArtworkLoader, MprisSource, SnapshotSource, SpotifySource};
use crate::ui;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("tunecard/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Build the configured source. For Spotify this runs the browser
/// authorization flow, so it must happen before the terminal is taken over.
pub fn build_source(
    settings: &Settings,
    http: &Client,
) -> Result<Box<dyn SnapshotSource>, Box<dyn std::error::Error>> {
    match settings.source.kind {
        SourceKind::Mpris => {
            let source = MprisSource::new(&settings.source.mpris_player);
            info!(bus_name = source.bus_name(), "following mpris player");
            Ok(Box::new(source))
        }
        SourceKind::Spotify => {
            let s = &settings.spotify;
            let credentials = Credentials {
                client_id: s.client_id.clone(),
                client_secret: s.client_secret.clone(),
                redirect_uri: s.redirect_uri.clone(),
                scope: s.scope.clone(),
            };
            let session = auth::authorize(
                http,
                credentials,
                Duration::from_secs(s.callback_timeout_secs),
            )?;
            info!("spotify authorized");
            Ok(Box::new(SpotifySource::new(http.clone(), session)))
        }
    }
}

/// Artwork loader sized to the card's artwork cells, two pixels per row.
pub fn artwork_loader(settings: &Settings, http: &Client) -> Option<ArtworkLoader> {
    if !settings.source.artwork {
        return None;
    }
    let (cols, rows) = ui::artwork_cells(settings.overlay.width, settings.overlay.height);
    if cols == 0 || rows == 0 {
        return None;
    }
    Some(ArtworkLoader::new(
        http.clone(),
        u32::from(cols),
        u32::from(rows) * 2,
    ))
}
