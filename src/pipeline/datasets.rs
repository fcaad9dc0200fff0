use futures::{StreamExt, stream};

use crate::{
    Res, info,
    management::Dataset,
    spotify,
    types::{TrackRecord, UserDetails},
    warning,
};

use super::Pipeline;

impl Pipeline {
    /// Collects the tracks of every playlist into `user_songs.csv`.
    ///
    /// Playlists are fetched by a bounded pool of workers. A playlist that
    /// still fails after its retries contributes no tracks; the run goes on.
    ///
    /// Returns `(total_playlists, total_playlist_tracks)` as reported by the
    /// playlist listing, independent of any per-playlist track limit.
    pub async fn fetch_and_save_user_tracks(&self) -> Res<(u64, u64)> {
        let playlists = self.spotify.playlists().await?;
        let total_playlists = playlists.len() as u64;
        let total_playlist_tracks: u64 = playlists.iter().map(|p| p.track_total()).sum();
        info!(
            "[Pipeline] Found {} playlists with a total of {} tracks",
            total_playlists, total_playlist_tracks
        );

        let max_tracks = self.options.max_tracks_per_playlist;
        let retry = self.options.playlist_retry;
        let per_playlist: Vec<Vec<TrackRecord>> = stream::iter(playlists)
            .map(|playlist| {
                let spotify = self.spotify.clone();
                async move {
                    let name = playlist.display_name();
                    match retry
                        .run(name, || spotify.playlist_tracks(&playlist, max_tracks))
                        .await
                    {
                        Ok(tracks) => {
                            info!("[Pipeline] {}: collected {} tracks", name, tracks.len());
                            tracks
                        }
                        Err(_) => {
                            warning!(
                                "[Pipeline] Giving up on playlist '{}' after {} attempts",
                                name,
                                retry.attempts
                            );
                            Vec::new()
                        }
                    }
                }
            })
            .buffered(self.options.playlist_workers.max(1))
            .collect()
            .await;

        let all_tracks: Vec<TrackRecord> = per_playlist.into_iter().flatten().collect();
        let path = self
            .store
            .write_tracks(Dataset::UserSongs, &all_tracks)
            .await?;
        info!(
            "[Pipeline] Saved {} tracks to {}",
            all_tracks.len(),
            path.display()
        );

        Ok((total_playlists, total_playlist_tracks))
    }

    pub async fn fetch_and_save_top_tracks(&self) -> Res<usize> {
        let tracks = self
            .spotify
            .top_track_records(self.options.top_limit)
            .await?;
        let path = self.store.write_tracks(Dataset::TopTracks, &tracks).await?;
        info!(
            "[Pipeline] Saved {} top tracks to {}",
            tracks.len(),
            path.display()
        );
        Ok(tracks.len())
    }

    pub async fn fetch_and_save_recent_tracks(&self) -> Res<usize> {
        let tracks = self
            .spotify
            .recent_track_records(self.options.recent_limit)
            .await?;
        let path = self
            .store
            .write_tracks(Dataset::RecentTracks, &tracks)
            .await?;
        info!(
            "[Pipeline] Saved {} recent tracks to {}",
            tracks.len(),
            path.display()
        );
        Ok(tracks.len())
    }

    /// Writes `user_details.json` from the profile and the playlist totals.
    pub async fn fetch_and_save_user_details(
        &self,
        total_playlists: u64,
        total_playlist_tracks: u64,
    ) -> Res<UserDetails> {
        let profile = self.spotify.me().await?;
        let details = spotify::user_details(&profile, total_playlists, total_playlist_tracks)?;
        let path = self.store.save_details(&details).await?;
        info!("[Pipeline] Saved user details to {}", path.display());
        Ok(details)
    }
}
