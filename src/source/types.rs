//! Source trait, errors and the messages sent to the event loop.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::AuthError;
use crate::overlay::{ArtworkImage, TrackSnapshot};

/// Something that can be asked what is playing right now.
///
/// `Ok(None)` means nothing is playing. Errors mean the answer is unknown
/// for this cycle; the caller keeps showing what it had.
pub trait SnapshotSource: Send {
    fn name(&self) -> &str;
    fn fetch(&mut self) -> Result<Option<TrackSnapshot>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authorization failed: {0}")]
    Auth(#[from] AuthError),
    #[error("unexpected response status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("d-bus error: {0}")]
    Bus(#[from] zbus::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("unusable artwork url: {0}")]
    ArtworkUrl(String),
}

/// Messages from the poller thread to the state-owning event loop.
#[derive(Debug)]
pub enum SourceMsg {
    Snapshot(Option<TrackSnapshot>),
    Artwork {
        url: String,
        image: Arc<ArtworkImage>,
    },
}
