//! Cleanup and distributions over the stored datasets.

use std::{collections::HashMap, hash::Hash};

use crate::{
    error::StoreError,
    management::{Dataset, UserStore},
    types::TrackRecord,
};

/// Loads every dataset of the user and keeps the rows usable for charts.
///
/// See [`prepare_rows`] for what is dropped.
///
/// # Errors
///
/// `StoreError::NoDatasets` when none of the dataset files exists.
pub async fn load_user_data(store: &UserStore) -> Result<Vec<TrackRecord>, StoreError> {
    let mut rows = Vec::new();
    let mut found_any = false;
    for dataset in [Dataset::TopTracks, Dataset::RecentTracks, Dataset::UserSongs] {
        if let Some(tracks) = store.read_tracks(dataset).await? {
            found_any = true;
            rows.extend(tracks);
        }
    }

    if !found_any {
        return Err(StoreError::NoDatasets(
            store.datasets_dir().display().to_string(),
        ));
    }

    Ok(prepare_rows(rows))
}

/// Normalizes genres and drops rows that cannot be charted: no artist, no
/// track name, no listener count, or no genre left after normalization.
pub fn prepare_rows(rows: Vec<TrackRecord>) -> Vec<TrackRecord> {
    rows.into_iter()
        .filter(|r| !r.artist.is_empty() && !r.name.is_empty() && r.playcount.is_some())
        .map(|mut r| {
            r.genres = normalize_genres(&r.genres);
            r
        })
        .filter(|r| !r.genres.is_empty())
        .collect()
}

/// Folds the spellings of hip hop together, then dedupes and sorts.
pub fn normalize_genres(genres: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(|g| match g.to_lowercase().as_str() {
            "hip-hop" | "hip hop" => "hip hop".to_string(),
            _ => g.to_string(),
        })
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Counts occurrences, most frequent first; ties keep first-appearance order.
pub fn value_counts<T, I>(items: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut order: Vec<T> = Vec::new();
    let mut counts: HashMap<T, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item.clone()).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    let mut out: Vec<(T, usize)> = order
        .into_iter()
        .map(|item| {
            let count = counts.get(&item).copied().unwrap_or(0);
            (item, count)
        })
        .collect();
    // stable sort keeps first appearance among equal counts
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

pub fn genre_distribution(rows: &[TrackRecord]) -> Vec<(String, usize)> {
    value_counts(rows.iter().flat_map(|r| r.genres.iter().cloned()))
}

pub fn artist_distribution(rows: &[TrackRecord], top_n: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(rows.iter().map(|r| r.artist.clone()));
    counts.truncate(top_n);
    counts
}

pub fn album_distribution(rows: &[TrackRecord], top_n: usize) -> Vec<(String, usize)> {
    let mut counts = value_counts(
        rows.iter()
            .filter(|r| !r.album.is_empty())
            .map(|r| r.album.clone()),
    );
    counts.truncate(top_n);
    counts
}

pub fn playlist_distribution(rows: &[TrackRecord]) -> Vec<(String, usize)> {
    value_counts(rows.iter().map(|r| r.playlist.clone()))
}

/// Release years, oldest first.
pub fn year_distribution(rows: &[TrackRecord]) -> Vec<(i32, usize)> {
    let mut counts = value_counts(rows.iter().map(|r| r.year));
    counts.sort_by_key(|(year, _)| *year);
    counts
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaycountStats {
    pub mean: f64,
    pub max: u64,
    pub min: u64,
}

/// Mean, max and min of the listener counts; `None` without any count.
pub fn playcount_stats(rows: &[TrackRecord]) -> Option<PlaycountStats> {
    let counts: Vec<u64> = rows.iter().filter_map(|r| r.playcount).collect();
    let max = *counts.iter().max()?;
    let min = *counts.iter().min()?;
    let mean = counts.iter().map(|&c| c as f64).sum::<f64>() / counts.len() as f64;
    Some(PlaycountStats { mean, max, min })
}
