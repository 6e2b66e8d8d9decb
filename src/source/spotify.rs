use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::auth::Session;
use crate::overlay::TrackSnapshot;

use super::types::{SnapshotSource, SourceError};

pub const CURRENTLY_PLAYING_URL: &str = "https://api.spotify.com/v1/me/player/currently-playing";

// Wire types for the currently-playing endpoint. Every field is optional so a
// partial payload still maps to a snapshot.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CurrentlyPlaying {
    item: Option<Item>,
    progress_ms: Option<u64>,
    is_playing: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Item {
    name: String,
    duration_ms: Option<u64>,
    artists: Vec<Named>,
    album: Option<Collection>,
    /// Present for podcast episodes instead of artists/album.
    show: Option<Collection>,
    images: Vec<Image>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Collection {
    name: String,
    images: Vec<Image>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Image {
    url: String,
}

/// Map a currently-playing response body to a snapshot.
///
/// An empty body or a missing item means nothing is playing. Missing numbers
/// become 0 and a missing `is_playing` becomes false.
pub fn parse_currently_playing(body: &str) -> Result<Option<TrackSnapshot>, SourceError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let payload: CurrentlyPlaying = serde_json::from_str(body)?;
    let Some(item) = payload.item else {
        return Ok(None);
    };

    let artist = if item.artists.is_empty() {
        item.show.as_ref().map(|s| s.name.clone()).unwrap_or_default()
    } else {
        item.artists
            .iter()
            .map(|a| a.name.trim())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let album = item
        .album
        .as_ref()
        .or(item.show.as_ref())
        .map(|c| c.name.clone())
        .unwrap_or_default();

    // Images are ordered largest first.
    let artwork_url = item
        .album
        .as_ref()
        .and_then(|a| a.images.first())
        .or_else(|| item.images.first())
        .or_else(|| item.show.as_ref().and_then(|s| s.images.first()))
        .map(|i| i.url.clone());

    Ok(Some(
        TrackSnapshot::new(item.name, artist)
            .with_album(album)
            .with_artwork_url(artwork_url)
            .with_progress(
                payload.progress_ms.unwrap_or(0),
                item.duration_ms.unwrap_or(0),
            )
            .playing(payload.is_playing.unwrap_or(false)),
    ))
}

/// Spotify Web API source using the session's bearer credential.
pub struct SpotifySource {
    http: Client,
    session: Session,
}

impl SpotifySource {
    pub fn new(http: Client, session: Session) -> Self {
        Self { http, session }
    }
}

impl SnapshotSource for SpotifySource {
    fn name(&self) -> &str {
        "spotify"
    }

    fn fetch(&mut self) -> Result<Option<TrackSnapshot>, SourceError> {
        let token = self.session.bearer(&self.http)?.to_string();
        let response = self
            .http
            .get(CURRENTLY_PLAYING_URL)
            .bearer_auth(token)
            .query(&[("additional_types", "track,episode")])
            .send()?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::UNAUTHORIZED => {
                self.session.invalidate();
                Err(SourceError::Status(StatusCode::UNAUTHORIZED.as_u16()))
            }
            status if status.is_success() => parse_currently_playing(&response.text()?),
            status => Err(SourceError::Status(status.as_u16())),
        }
    }
}
