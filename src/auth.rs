//! OAuth2 authorization-code flow against the Spotify accounts service.
//!
//! The flow yields a `Session`, which hands out a bearer credential and
//! refreshes it shortly before it expires. Nothing is persisted.

mod callback;
mod error;
mod oauth;
mod session;

use std::time::{Duration, Instant};

use tracing::{info, warn};

use callback::wait_for_code;
use oauth::{authorize_url, exchange_code};

pub use error::AuthError;
pub use session::{Credentials, Session};

/// Run the whole flow: open the consent page, wait for the redirect and
/// exchange the code for tokens.
pub fn authorize(
    http: &reqwest::blocking::Client,
    credentials: Credentials,
    callback_timeout: Duration,
) -> Result<Session, AuthError> {
    credentials.validate()?;
    let url = authorize_url(&credentials)?;

    open_consent_page(url.as_str(), webbrowser::open);
    println!(
        "Waiting for the redirect to {} (timeout: {}s)...",
        credentials.redirect_uri,
        callback_timeout.as_secs()
    );
    info!("waiting for oauth callback");

    let code = wait_for_code(&credentials.redirect_uri, callback_timeout)?;
    let token = exchange_code(http, &credentials, &code)?;
    info!("authorization code exchanged");
    println!("Authorized.");

    Ok(Session::new(credentials, token, Instant::now()))
}

/// Print the consent URL and try to open it in the default browser.
/// Returns whether a browser was launched.
fn open_consent_page(url: &str, open: impl FnOnce(&str) -> std::io::Result<()>) -> bool {
    println!("Open this URL in your browser to authorize tunecard:\n\n  {url}\n");
    match open(url) {
        Ok(()) => {
            info!("opened consent page in browser");
            true
        }
        Err(e) => {
            warn!(error = %e, "could not open a browser, open the URL by hand");
            false
        }
    }
}
