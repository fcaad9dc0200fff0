use reqwest::{Client, Url};
use serde_json::Value;

use crate::{config::Settings, error::SpotifyError, info};

/// Builds the authorization URL the user is redirected to from `/login`.
pub fn build_authorize_url(settings: &Settings, code_challenge: &str) -> Result<String, SpotifyError> {
    let url = Url::parse_with_params(
        &settings.spotify_auth_url,
        &[
            ("client_id", settings.spotify_client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.spotify_redirect_uri.as_str()),
            ("scope", settings.spotify_scope.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
        ],
    )
    .map_err(|e| SpotifyError::Url(e.to_string()))?;

    Ok(url.to_string())
}

/// Exchanges an authorization code plus the PKCE verifier for an access token.
///
/// Only the access token is kept: refresh handling is out of scope, an
/// expired token simply sends the user through `/login` again.
pub async fn exchange_code(
    http: &Client,
    settings: &Settings,
    code: &str,
    code_verifier: &str,
) -> Result<String, SpotifyError> {
    info!("[OAuth] Exchanging code for token");

    let response = http
        .post(&settings.spotify_token_url)
        .form(&[
            ("client_id", settings.spotify_client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.spotify_redirect_uri.as_str()),
            ("code_verifier", code_verifier),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SpotifyError::Status {
            status: status.as_u16(),
            url: settings.spotify_token_url.clone(),
        });
    }

    let json: Value = response.json().await?;
    json["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or(SpotifyError::MissingField("access_token"))
}
