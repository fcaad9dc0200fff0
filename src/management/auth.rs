use std::{io::ErrorKind, path::PathBuf};

use crate::{error::StoreError, types::TokenCache, utils};

/// Per-user access-token cache (`<data>/.spotify_token_cache_<user>.json`).
///
/// Lets the CLI run the pipeline for a user who logged in through the
/// dashboard. Tokens are never refreshed.
#[derive(Debug, Clone)]
pub struct TokenStore {
    data_dir: PathBuf,
}

impl TokenStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The cached access token of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` when no token was cached for the user and
    /// `StoreError::Json` when the cache file is corrupt.
    pub async fn load(&self, user_id: &str) -> Result<String, StoreError> {
        let content = async_fs::read_to_string(self.token_path(user_id)).await?;
        let token: TokenCache = serde_json::from_str(&content)?;
        Ok(token.access_token)
    }

    /// Caches `access_token` for `user_id`, replacing any previous token.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory or the file cannot be written.
    pub async fn persist(&self, user_id: &str, access_token: &str) -> Result<(), StoreError> {
        async_fs::create_dir_all(&self.data_dir).await?;

        let json = serde_json::to_string(&TokenCache {
            access_token: access_token.to_string(),
        })?;
        async_fs::write(self.token_path(user_id), json).await?;
        Ok(())
    }

    /// Deletes the cached token. A missing file is not an error.
    pub async fn remove(&self, user_id: &str) -> Result<(), StoreError> {
        match async_fs::remove_file(self.token_path(user_id)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    pub fn token_path(&self, user_id: &str) -> PathBuf {
        self.data_dir.join(format!(
            ".spotify_token_cache_{}.json",
            utils::sanitize_path_segment(user_id)
        ))
    }
}
