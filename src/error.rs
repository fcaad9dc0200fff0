//! Error types for each concern of the dashboard.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("spotify request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spotify returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("spotify response is missing {0}")]
    MissingField(&'static str),

    #[error("invalid url: {0}")]
    Url(String),
}

#[derive(Debug, Error)]
pub enum LastFmError {
    #[error("last.fm request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("last.fm returned {0}")]
    Status(u16),

    #[error("last.fm returned an unreadable body")]
    Body,

    #[error("last.fm error {code}: {message}")]
    Api { code: i64, message: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no datasets found in {0}")]
    NoDatasets(String),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("nothing to plot: {0}")]
    Empty(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}
