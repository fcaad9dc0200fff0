use std::path::PathBuf;

use crate::{Res, charts, info, success, warning};

use super::Pipeline;

/// Outcome of [`Pipeline::run_full_sync`].
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub total_playlists: u64,
    pub total_playlist_tracks: u64,
    pub top_tracks: usize,
    pub recent_tracks: usize,
    pub enriched_rows: usize,
    pub plots: Vec<PathBuf>,
}

impl Pipeline {
    /// Runs every stage for the user: playlist tracks, top and recent tracks,
    /// similar songs, artist genres, user details and finally the plots.
    ///
    /// Fetch stages propagate their errors. The plots are best effort: a
    /// failure there is logged and leaves `plots` empty.
    pub async fn run_full_sync(&self) -> Res<SyncReport> {
        let user = self.store.user_id().to_string();
        info!("[Pipeline] Starting sync for {}", user);

        let (total_playlists, total_playlist_tracks) = self.fetch_and_save_user_tracks().await?;
        let top_tracks = self.fetch_and_save_top_tracks().await?;
        let recent_tracks = self.fetch_and_save_recent_tracks().await?;

        self.enrich_similar_songs().await?;
        let enriched_rows = self.enrich_user_songs().await?;
        self.fetch_and_save_user_details(total_playlists, total_playlist_tracks)
            .await?;

        let plots = match charts::generate_all_user_plots(&self.store).await {
            Ok(plots) => plots,
            Err(e) => {
                warning!("[Plots] Skipped plots for {}: {}", user, e);
                Vec::new()
            }
        };

        success!(
            "[Pipeline] Sync for {} done: {} playlists, {} enriched rows, {} plots",
            user,
            total_playlists,
            enriched_rows,
            plots.len()
        );

        Ok(SyncReport {
            total_playlists,
            total_playlist_tracks,
            top_tracks,
            recent_tracks,
            enriched_rows,
            plots,
        })
    }
}
