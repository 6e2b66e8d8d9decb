use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::error::AuthError;
use super::session::Credentials;

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Body of a successful token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Consent page URL the user has to open.
pub fn authorize_url(credentials: &Credentials) -> Result<Url, AuthError> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("scope", credentials.scope.as_str()),
        ],
    )
    .map_err(|e| AuthError::InvalidUrl(e.to_string()))
}

pub fn exchange_code(
    http: &Client,
    credentials: &Credentials,
    code: &str,
) -> Result<TokenResponse, AuthError> {
    request_token(
        http,
        credentials,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ],
    )
}

/// POST to the token endpoint with HTTP Basic client authentication.
pub(super) fn request_token(
    http: &Client,
    credentials: &Credentials,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let response = http
        .post(TOKEN_URL)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(form)
        .send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<TokenResponse>()?)
}
