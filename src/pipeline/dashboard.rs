use futures::{StreamExt, stream};

use crate::{
    Res, info,
    spotify::dashboard_track,
    types::{DashboardTrack, SimilarSong},
};

use super::{LookupCache, Pipeline};

impl Pipeline {
    /// Top and recently played tracks for the dashboard, each with the
    /// artist's top genres and a few similar songs.
    ///
    /// Top tracks carry their 1-based rank.
    pub async fn fetch_tracks_with_genres_and_similar(
        &self,
    ) -> Res<(Vec<DashboardTrack>, Vec<DashboardTrack>)> {
        let top = self.spotify.top_tracks(self.options.top_limit).await?;
        let recent = self.spotify.recent_tracks(self.options.recent_limit).await?;

        let mut top_tracks: Vec<DashboardTrack> = top
            .iter()
            .enumerate()
            .map(|(i, t)| dashboard_track(t, Some(i as u32 + 1)))
            .collect();
        let mut recent_tracks: Vec<DashboardTrack> =
            recent.iter().map(|t| dashboard_track(t, None)).collect();

        let genre_cache: LookupCache<String, Vec<String>> = LookupCache::new();
        let similar_cache: LookupCache<(String, String), Vec<SimilarSong>> = LookupCache::new();

        let top_found = self
            .decorate(&top_tracks, &genre_cache, &similar_cache)
            .await;
        let recent_found = self
            .decorate(&recent_tracks, &genre_cache, &similar_cache)
            .await;
        for (idx, genres, similar) in top_found {
            top_tracks[idx].genre = genres;
            top_tracks[idx].similar_songs = similar;
        }
        for (idx, genres, similar) in recent_found {
            recent_tracks[idx].genre = genres;
            recent_tracks[idx].similar_songs = similar;
        }

        info!(
            "[Pipeline] Dashboard tracks ready: {} top, {} recent",
            top_tracks.len(),
            recent_tracks.len()
        );
        Ok((top_tracks, recent_tracks))
    }

    async fn decorate(
        &self,
        tracks: &[DashboardTrack],
        genre_cache: &LookupCache<String, Vec<String>>,
        similar_cache: &LookupCache<(String, String), Vec<SimilarSong>>,
    ) -> Vec<(usize, Vec<String>, Vec<SimilarSong>)> {
        let max_genres = self.options.max_genres;
        let max_similar = self.options.max_similar;
        let lookups: Vec<(usize, String, String)> = tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.artist.is_empty())
            .map(|(idx, t)| (idx, t.artist.clone(), t.name.clone()))
            .collect();

        stream::iter(lookups)
            .map(|(idx, artist, name)| {
                let genre_cache = genre_cache.clone();
                let similar_cache = similar_cache.clone();
                let lastfm = self.lastfm.clone();
                async move {
                    let genres = genre_cache.get_or_fetch(artist.clone(), || {
                        lastfm.artist_top_tags(&artist, max_genres)
                    });
                    let similar = async {
                        if name.is_empty() {
                            return Vec::new();
                        }
                        similar_cache
                            .get_or_fetch((artist.clone(), name.clone()), || {
                                lastfm.similar_tracks(&artist, &name, max_similar)
                            })
                            .await
                    };
                    let (genres, similar) = tokio::join!(genres, similar);
                    (idx, genres, similar)
                }
            })
            .buffer_unordered(self.options.dashboard_workers.max(1))
            .collect()
            .await
    }
}
