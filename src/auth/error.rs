use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("spotify credentials are not configured: set spotify.{0}")]
    NotConfigured(&'static str),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("callback listener failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("authorization denied: {0}")]
    Denied(String),
    #[error("no authorization code received within {0:?}")]
    Timeout(Duration),
    #[error("no refresh token available")]
    MissingRefreshToken,
}
