use std::time::Duration;

use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{error::SpotifyError, warning};

const MAX_ATTEMPTS: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bearer-authenticated client for the Spotify Web API.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: String,
    retry_delay: Duration,
}

impl SpotifyClient {
    /// Creates a client for `api_url` (e.g. `https://api.spotify.com/v1`)
    /// authenticated with the user's access token.
    ///
    /// A trailing slash on `api_url` is ignored.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use listenlens::spotify::SpotifyClient;
    ///
    /// let client = SpotifyClient::new("https://api.spotify.com/v1", token);
    /// let profile = client.me().await?;
    /// ```
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_http(Client::new(), api_url, token)
    }

    /// Like [`SpotifyClient::new`] but reuses an existing connection pool.
    pub fn with_http(http: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Delay between retries of `502`/`503`/`504` responses.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Absolute URL for an API path. `next` links are already absolute and
    /// pass through untouched.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.api_url, path.trim_start_matches('/'))
        }
    }

    /// GETs a JSON document.
    ///
    /// `429 Too Many Requests` is retried after the `Retry-After` delay when it
    /// is at most two minutes. `502`, `503` and `504` are retried after a fixed
    /// delay. At most three attempts are made; every other non-2xx status is
    /// returned as `SpotifyError::Status`.
    ///
    /// # Arguments
    ///
    /// * `path` - API path relative to the base URL, or an absolute `next` link
    ///
    /// # Errors
    ///
    /// * `SpotifyError::Http` - the request could not be sent or the body was
    ///   not valid JSON for `T`
    /// * `SpotifyError::Status` - a non-2xx status after the retries, including
    ///   `401` for an expired token
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SpotifyError> {
        let url = self.endpoint(path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response.json::<T>().await?);
            }

            if attempt < MAX_ATTEMPTS {
                if status == StatusCode::TOO_MANY_REQUESTS {
                    let wait = retry_after(&response).unwrap_or(1);
                    if wait <= MAX_RETRY_AFTER_SECS {
                        warning!("[Spotify] rate limited, retrying in {}s: {}", wait, url);
                        sleep(Duration::from_secs(wait)).await;
                        continue;
                    }
                    warning!("[Spotify] Retry-After of {}s is too long: {}", wait, url);
                } else if matches!(
                    status,
                    StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                ) {
                    sleep(self.retry_delay).await;
                    continue;
                }
            }

            return Err(SpotifyError::Status {
                status: status.as_u16(),
                url,
            });
        }
    }
}

fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
