use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::info;

use super::error::AuthError;
use super::oauth::{TokenResponse, request_token};

/// Refresh this long before the access token actually expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

const PLACEHOLDER_PREFIX: &str = "YOUR_";

/// Application credentials registered with the accounts service.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl Credentials {
    /// Reject empty or placeholder values before any network traffic.
    pub fn validate(&self) -> Result<(), AuthError> {
        let missing = |v: &str| v.trim().is_empty() || v.starts_with(PLACEHOLDER_PREFIX);
        if missing(&self.client_id) {
            return Err(AuthError::NotConfigured("client_id"));
        }
        if missing(&self.client_secret) {
            return Err(AuthError::NotConfigured("client_secret"));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(AuthError::NotConfigured("redirect_uri"));
        }
        Ok(())
    }
}

/// Bearer credential plus what is needed to renew it.
pub struct Session {
    credentials: Credentials,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
}

impl Session {
    pub fn new(credentials: Credentials, token: TokenResponse, now: Instant) -> Self {
        let mut session = Self {
            credentials,
            access_token: String::new(),
            refresh_token: None,
            expires_at: now,
        };
        session.apply(token, now);
        session
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        now.checked_add(REFRESH_MARGIN)
            .is_none_or(|t| t >= self.expires_at)
    }

    /// Current access token, refreshed first when it is about to expire.
    pub fn bearer(&mut self, http: &Client) -> Result<&str, AuthError> {
        if self.needs_refresh(Instant::now()) {
            self.refresh(http)?;
        }
        Ok(&self.access_token)
    }

    pub fn refresh(&mut self, http: &Client) -> Result<(), AuthError> {
        let Some(refresh_token) = self.refresh_token.clone() else {
            return Err(AuthError::MissingRefreshToken);
        };
        let token = request_token(
            http,
            &self.credentials,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ],
        )?;
        self.apply(token, Instant::now());
        info!("access token refreshed");
        Ok(())
    }

    /// Force a refresh before the next request (e.g. after a 401).
    pub fn invalidate(&mut self) {
        self.expires_at = Instant::now();
    }

    fn apply(&mut self, token: TokenResponse, now: Instant) {
        self.access_token = token.access_token;
        // The refresh grant may omit the refresh token; keep the old one then.
        if let Some(refresh) = token.refresh_token {
            self.refresh_token = Some(refresh);
        }
        // An absurd lifetime counts as already expired.
        self.expires_at = now
            .checked_add(Duration::from_secs(token.expires_in))
            .unwrap_or(now);
    }
}
