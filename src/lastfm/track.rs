use serde_json::Value;

use crate::types::SimilarSong;

use super::{LastFmClient, as_list};

impl LastFmClient {
    /// `track.getSimilar`: up to `limit` tracks similar to `artist - track`.
    pub async fn similar_tracks(&self, artist: &str, track: &str, limit: usize) -> Vec<SimilarSong> {
        let limit_param = limit.to_string();
        match self
            .get_with_retries(&[
                ("method", "track.getSimilar"),
                ("artist", artist),
                ("track", track),
                ("limit", limit_param.as_str()),
            ])
            .await
        {
            Some(body) => parse_similar_tracks(&body, limit),
            None => Vec::new(),
        }
    }
}

pub fn parse_similar_tracks(body: &Value, limit: usize) -> Vec<SimilarSong> {
    as_list(&body["similartracks"]["track"])
        .into_iter()
        .take(limit)
        .map(|t| SimilarSong {
            name: t["name"].as_str().unwrap_or("Unknown").to_string(),
            artist: t["artist"]["name"].as_str().unwrap_or("Unknown").to_string(),
        })
        .collect()
}
