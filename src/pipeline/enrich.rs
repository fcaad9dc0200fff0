use std::collections::HashSet;

use futures::{StreamExt, stream};

use crate::{
    Res, info,
    lastfm::ArtistInfo,
    management::Dataset,
    types::{SimilarSong, TrackRecord},
};

use super::{LookupCache, Pipeline};

impl Pipeline {
    /// Merges the three datasets into `user_songs.csv` with genres and
    /// listener counts per artist.
    ///
    /// Rows are deduplicated by (name, artist), keeping the first occurrence.
    /// Every unique artist is looked up once. Returns the number of rows
    /// written, `0` when no dataset exists yet.
    pub async fn enrich_user_songs(&self) -> Res<usize> {
        let mut rows = Vec::new();
        let mut found_any = false;
        for dataset in Dataset::ALL {
            match self.store.read_tracks(dataset).await? {
                Some(tracks) => {
                    info!("[Pipeline] Reading {}", dataset.file_name());
                    found_any = true;
                    rows.extend(tracks);
                }
                None => info!("[Pipeline] {} not found, skipping", dataset.file_name()),
            }
        }
        if !found_any {
            info!("[Pipeline] No datasets found, nothing to enrich");
            return Ok(0);
        }

        let before = rows.len();
        let mut rows = dedupe_tracks(rows);
        info!(
            "[Pipeline] Dropped {} duplicates, {} rows remain",
            before - rows.len(),
            rows.len()
        );

        let artists = unique_artists(&rows);
        info!(
            "[Pipeline] Fetching info for {} unique artists...",
            artists.len()
        );

        let cache: LookupCache<String, ArtistInfo> = LookupCache::new();
        stream::iter(artists)
            .for_each_concurrent(self.options.lastfm_workers.max(1), |artist| {
                let cache = cache.clone();
                let lastfm = self.lastfm.clone();
                async move {
                    let found = cache
                        .get_or_fetch(artist.clone(), || lastfm.artist_info(&artist))
                        .await;
                    info!(
                        "[Pipeline] Fetched: {} | genres: {:?} | listeners: {}",
                        artist, found.genres, found.listeners
                    );
                }
            })
            .await;

        for row in rows.iter_mut() {
            let found = cache.get(&row.artist).await.unwrap_or_default();
            row.genres = found.genres;
            row.playcount = Some(found.listeners);
        }

        let path = self.store.write_tracks(Dataset::UserSongs, &rows).await?;
        info!(
            "[Pipeline] Saved enriched dataset to {} ({} rows)",
            path.display(),
            rows.len()
        );
        Ok(rows.len())
    }

    /// Adds up to `max_similar` similar songs to every row of the top and
    /// recent datasets that has both an artist and a track name.
    ///
    /// The cache is shared by both files, so a track that is both a top and
    /// a recent track is looked up once. Returns the number of rows written.
    pub async fn enrich_similar_songs(&self) -> Res<usize> {
        let cache: LookupCache<(String, String), Vec<SimilarSong>> = LookupCache::new();
        let mut written = 0;

        for dataset in [Dataset::TopTracks, Dataset::RecentTracks] {
            let Some(mut rows) = self.store.read_tracks(dataset).await? else {
                info!("[Pipeline] {} not found, skipping", dataset.file_name());
                continue;
            };

            let found = self.similar_for_rows(&rows, &cache).await;
            for (idx, songs) in found {
                rows[idx].similar_songs = Some(songs);
            }

            self.store.write_tracks(dataset, &rows).await?;
            info!(
                "[Pipeline] Enriched similar songs in {} ({} rows)",
                dataset.file_name(),
                rows.len()
            );
            written += rows.len();
        }

        Ok(written)
    }

    async fn similar_for_rows(
        &self,
        rows: &[TrackRecord],
        cache: &LookupCache<(String, String), Vec<SimilarSong>>,
    ) -> Vec<(usize, Vec<SimilarSong>)> {
        let limit = self.options.max_similar;
        let lookups: Vec<(usize, (String, String))> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.artist.is_empty() && !r.name.is_empty())
            .map(|(idx, r)| (idx, r.key()))
            .collect();

        stream::iter(lookups)
            .map(|(idx, key)| {
                let cache = cache.clone();
                let lastfm = self.lastfm.clone();
                async move {
                    let (artist, name) = key.clone();
                    let songs = cache
                        .get_or_fetch(key, || async move {
                            lastfm.similar_tracks(&artist, &name, limit).await
                        })
                        .await;
                    (idx, songs)
                }
            })
            .buffer_unordered(self.options.lastfm_workers.max(1))
            .collect()
            .await
    }
}

/// Drops rows whose (name, artist) pair was already seen, keeping the first.
pub fn dedupe_tracks(rows: Vec<TrackRecord>) -> Vec<TrackRecord> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|r| seen.insert((r.name.clone(), r.artist.clone())))
        .collect()
}

/// Non-empty artist names in order of first appearance.
pub fn unique_artists(rows: &[TrackRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| !r.artist.is_empty())
        .filter(|r| seen.insert(r.artist.as_str()))
        .map(|r| r.artist.clone())
        .collect()
}
