use std::path::{Path, PathBuf};

use crate::{
    error::StoreError,
    types::{TrackRecord, UserDetails},
    utils,
};

/// The three dataset files kept per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    UserSongs,
    TopTracks,
    RecentTracks,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::UserSongs, Dataset::TopTracks, Dataset::RecentTracks];

    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::UserSongs => "user_songs.csv",
            Dataset::TopTracks => "top_tracks.csv",
            Dataset::RecentTracks => "recent_tracks.csv",
        }
    }
}

/// A user's directory: `<data>/<user>/` with `datasets/`, `plots/` and
/// `user_details.json`.
#[derive(Debug, Clone)]
pub struct UserStore {
    user_id: String,
    root: PathBuf,
}

impl UserStore {
    pub fn new(data_dir: impl AsRef<Path>, user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            root: data_dir
                .as_ref()
                .join(utils::sanitize_path_segment(user_id)),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn datasets_dir(&self) -> PathBuf {
        self.root.join("datasets")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.root.join("plots")
    }

    pub fn dataset_path(&self, dataset: Dataset) -> PathBuf {
        self.datasets_dir().join(dataset.file_name())
    }

    /// Writes a dataset, replacing the previous file.
    ///
    /// The `playcount` and `similar_songs` columns are only written when at
    /// least one row carries a value for them.
    pub async fn write_tracks(
        &self,
        dataset: Dataset,
        rows: &[TrackRecord],
    ) -> Result<PathBuf, StoreError> {
        let with_playcount = rows.iter().any(|r| r.playcount.is_some());
        let with_similar = rows.iter().any(|r| r.similar_songs.is_some());

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(TrackRecord::csv_header(with_playcount, with_similar))?;
        for row in rows {
            writer.write_record(row.csv_row(with_playcount, with_similar))?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        async_fs::create_dir_all(self.datasets_dir()).await?;
        let path = self.dataset_path(dataset);
        async_fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Reads a dataset. `Ok(None)` when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Csv` for a row that does not match the columns and
    /// `StoreError::Io` when the file exists but cannot be read.
    pub async fn read_tracks(&self, dataset: Dataset) -> Result<Option<Vec<TrackRecord>>, StoreError> {
        let path = self.dataset_path(dataset);
        if !path.is_file() {
            return Ok(None);
        }

        let bytes = async_fs::read(&path).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let rows = reader
            .deserialize::<TrackRecord>()
            .collect::<Result<Vec<_>, csv::Error>>()?;
        Ok(Some(rows))
    }

    /// Writes `user_details.json` and returns its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the user directory or the file cannot be written.
    pub async fn save_details(&self, details: &UserDetails) -> Result<PathBuf, StoreError> {
        async_fs::create_dir_all(&self.root).await?;
        let path = self.root.join("user_details.json");
        async_fs::write(&path, serde_json::to_string_pretty(details)?).await?;
        Ok(path)
    }

    pub async fn load_details(&self) -> Result<UserDetails, StoreError> {
        let content = async_fs::read_to_string(self.root.join("user_details.json")).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
