//! Last.fm metadata client.
//!
//! Supplies the enrichment data: artist genre tags and listener counts,
//! and similar-track suggestions. Every request goes through a shared rate
//! limiter (5 requests per second across all tasks) and a [`RetryPolicy`].
//! A lookup that still fails after the last attempt yields empty data, never
//! an error: enrichment is best effort.

mod artist;
mod track;

use std::{sync::Arc, time::Duration};

use reqwest::Client;
use serde_json::Value;
use tokio::{
    sync::Mutex,
    time::{Instant, sleep_until},
};

use crate::{error::LastFmError, pipeline::RetryPolicy, warning};

pub use artist::{ArtistInfo, parse_artist_info, parse_top_tags};
pub use track::parse_similar_tracks;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(200);
/// Last.fm error code for unknown artists and tracks.
const NOT_FOUND: i64 = 6;

/// Spaces requests at least `interval` apart, across all clones.
#[derive(Debug)]
struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let slot = (*next).max(Instant::now());
            *next = slot + self.interval;
            slot
        };
        sleep_until(slot).await;
    }
}

#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: Client,
    api_url: String,
    api_key: String,
    retry: RetryPolicy,
    limiter: Arc<RateLimiter>,
}

impl LastFmClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, retry: RetryPolicy) -> Self {
        Self::with_http(Client::new(), api_url, api_key, retry)
    }

    pub fn with_http(
        http: Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            retry,
            limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)),
        }
    }

    /// Overrides the minimum spacing between two requests.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.limiter = Arc::new(RateLimiter::new(interval));
        self
    }

    /// Calls an API method, retrying failures per the client's policy.
    ///
    /// Returns `None` when every attempt failed or Last.fm reports the
    /// artist/track as unknown.
    pub async fn get_with_retries(&self, params: &[(&str, &str)]) -> Option<Value> {
        let label = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        match self.retry.run(&label, || self.request(params)).await {
            Ok(value) => value,
            Err(e) => {
                warning!(
                    "[Pipeline] Failed to fetch after {} retries: {} ({})",
                    self.retry.attempts,
                    label,
                    e
                );
                None
            }
        }
    }

    async fn request(&self, params: &[(&str, &str)]) -> Result<Option<Value>, LastFmError> {
        self.limiter.acquire().await;

        let response = self
            .http
            .get(&self.api_url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        // Last.fm reports API errors with a JSON body, sometimes alongside a 4xx.
        let body: Option<Value> = response.json().await.ok();

        if let Some(code) = body.as_ref().and_then(|b| b.get("error")).and_then(Value::as_i64) {
            if code == NOT_FOUND {
                return Ok(None);
            }
            let message = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(LastFmError::Api { code, message });
        }

        if !status.is_success() {
            return Err(LastFmError::Status(status.as_u16()));
        }

        match body {
            Some(body) => Ok(Some(body)),
            None => Err(LastFmError::Body),
        }
    }
}

/// Last.fm collapses single-element lists into a bare object.
pub(crate) fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}
