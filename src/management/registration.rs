use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{error::StoreError, types::Registration};

/// Access requests submitted from the home page (`<data>/registrations.json`).
///
/// Apps in Spotify's development mode only accept allow-listed accounts, so
/// new users ask to be added by email. The file is shared by every user;
/// clones of the store share one write lock so appends never interleave.
#[derive(Debug, Clone)]
pub struct RegistrationStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl RegistrationStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join("registrations.json"),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored requests, oldest first.
    ///
    /// # Errors
    ///
    /// A missing file is an empty list. A file that cannot be read or parsed
    /// is an error, so a later append never replaces it.
    pub async fn load(&self) -> Result<Vec<Registration>, StoreError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Appends one request with trimmed fields and the current UTC time.
    ///
    /// The new list is written to a sibling temp file and renamed over the
    /// old one.
    ///
    /// # Errors
    ///
    /// Fails without touching the file when the existing list is unreadable.
    pub async fn append(&self, email: &str, username: &str) -> Result<Registration, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.load().await?;
        let registration = Registration {
            email: email.trim().to_string(),
            username: username.trim().to_string(),
            requested_at: Utc::now().to_rfc3339(),
        };
        all.push(registration.clone());

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let staging = self.path.with_extension("json.tmp");
        async_fs::write(&staging, serde_json::to_string_pretty(&all)?).await?;
        async_fs::rename(&staging, &self.path).await?;
        Ok(registration)
    }
}
