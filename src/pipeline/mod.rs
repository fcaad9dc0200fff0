//! # Enrichment Pipeline
//!
//! Pulls the user's listening data from Spotify and enriches it with Last.fm
//! metadata:
//!
//! ```text
//! playlists (paged) ──► playlist tracks (8 workers, 2 tries each) ──► user_songs.csv
//! top tracks / recent tracks ─────────────────────────────────────► top_tracks.csv, recent_tracks.csv
//!                      │
//!                      ▼
//! similar songs per (artist, track)  ──► similar_songs column of top/recent
//! genres + listeners per unique artist ──► genres/playcount columns of user_songs
//! ```
//!
//! Lookups fan out with bounded concurrency and go through a shared
//! [`LookupCache`], so every artist and every (artist, track) pair is asked
//! for at most once per run. Per-item failures are logged and skipped.

mod cache;
mod dashboard;
mod datasets;
mod enrich;
mod retry;
mod sync;

use std::time::Duration;

pub use cache::LookupCache;
pub use enrich::{dedupe_tracks, unique_artists};
pub use retry::RetryPolicy;
pub use sync::SyncReport;

use crate::{
    config::Settings, lastfm::LastFmClient, management::UserStore, spotify::SpotifyClient,
};

/// Tuning knobs of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub playlist_workers: usize,
    pub playlist_retry: RetryPolicy,
    pub max_tracks_per_playlist: Option<usize>,
    pub lastfm_workers: usize,
    pub dashboard_workers: usize,
    pub top_limit: u32,
    pub recent_limit: u32,
    pub max_genres: usize,
    pub max_similar: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            playlist_workers: 8,
            playlist_retry: RetryPolicy::fixed(2, Duration::from_secs(1)),
            max_tracks_per_playlist: None,
            lastfm_workers: 8,
            dashboard_workers: 10,
            top_limit: 50,
            recent_limit: 50,
            max_genres: 3,
            max_similar: 3,
        }
    }
}

/// Default Last.fm retry policy: three attempts, waiting 2 s then 4 s.
pub const LASTFM_RETRY: RetryPolicy = RetryPolicy::linear(3, Duration::from_secs(2));

/// One user's pipeline: the two API clients and the user's storage directory.
#[derive(Debug, Clone)]
pub struct Pipeline {
    spotify: SpotifyClient,
    lastfm: LastFmClient,
    store: UserStore,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        spotify: SpotifyClient,
        lastfm: LastFmClient,
        store: UserStore,
        options: PipelineOptions,
    ) -> Self {
        Self {
            spotify,
            lastfm,
            store,
            options,
        }
    }

    /// Builds clients from the settings for `user_id` authenticated with `access_token`.
    pub fn from_settings(settings: &Settings, user_id: &str, access_token: &str) -> Self {
        Self::new(
            SpotifyClient::new(&settings.spotify_api_url, access_token),
            LastFmClient::new(
                &settings.lastfm_api_url,
                &settings.lastfm_api_key,
                LASTFM_RETRY,
            ),
            UserStore::new(&settings.data_dir, user_id),
            PipelineOptions::default(),
        )
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }
}
