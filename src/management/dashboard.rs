use std::{io::ErrorKind, path::PathBuf, time::Duration};

use chrono::Utc;

use crate::{
    error::StoreError,
    types::{DashboardSnapshot, DashboardTrack, UserDetails},
    utils,
};

/// Dashboard data of one user with a time-to-live
/// (`<data>/user_cache_<user>.json`).
#[derive(Debug, Clone)]
pub struct DashboardCache {
    data_dir: PathBuf,
    ttl: Duration,
}

impl DashboardCache {
    pub fn new(data_dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            data_dir: data_dir.into(),
            ttl,
        }
    }

    /// The cached snapshot, if present, readable and younger than the TTL.
    pub async fn load(&self, user_id: &str) -> Option<DashboardSnapshot> {
        let content = async_fs::read_to_string(self.cache_path(user_id)).await.ok()?;
        let snapshot: DashboardSnapshot = serde_json::from_str(&content).ok()?;

        let age = now_secs() - snapshot.timestamp;
        if age < self.ttl.as_secs_f64() {
            Some(snapshot)
        } else {
            None
        }
    }

    /// Writes a fresh snapshot stamped with the current time and returns it.
    ///
    /// # Arguments
    ///
    /// * `user_id` - owner of the cache file
    /// * `user` - profile block shown on the profile view
    /// * `top_tracks`, `recent_tracks` - decorated tracks for the tracks view
    /// * `access_token` - token the snapshot was fetched with
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or the file cannot be written.
    pub async fn persist(
        &self,
        user_id: &str,
        user: &UserDetails,
        top_tracks: &[DashboardTrack],
        recent_tracks: &[DashboardTrack],
        access_token: Option<&str>,
    ) -> Result<DashboardSnapshot, StoreError> {
        async_fs::create_dir_all(&self.data_dir).await?;

        let snapshot = DashboardSnapshot {
            timestamp: now_secs(),
            user: user.clone(),
            top_tracks: top_tracks.to_vec(),
            recent_tracks: recent_tracks.to_vec(),
            access_token: access_token.map(str::to_string),
        };
        async_fs::write(self.cache_path(user_id), serde_json::to_string(&snapshot)?).await?;
        Ok(snapshot)
    }

    /// Drops the snapshot. A missing file is not an error.
    pub async fn delete(&self, user_id: &str) -> Result<(), StoreError> {
        match async_fs::remove_file(self.cache_path(user_id)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    pub fn cache_path(&self, user_id: &str) -> PathBuf {
        self.data_dir.join(format!(
            "user_cache_{}.json",
            utils::sanitize_path_segment(user_id)
        ))
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
