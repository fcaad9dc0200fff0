use serde_json::Value;

use super::{LastFmClient, as_list};

/// Genre tags and listener count of an artist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistInfo {
    pub genres: Vec<String>,
    pub listeners: u64,
}

const MAX_INFO_GENRES: usize = 3;

impl LastFmClient {
    /// `artist.getInfo`: the artist's first three tags and its listener count.
    pub async fn artist_info(&self, artist: &str) -> ArtistInfo {
        match self
            .get_with_retries(&[("method", "artist.getInfo"), ("artist", artist)])
            .await
        {
            Some(body) => parse_artist_info(&body),
            None => ArtistInfo::default(),
        }
    }

    /// `artist.getTopTags`: up to `max` tag names, most popular first.
    pub async fn artist_top_tags(&self, artist: &str, max: usize) -> Vec<String> {
        match self
            .get_with_retries(&[("method", "artist.getTopTags"), ("artist", artist)])
            .await
        {
            Some(body) => parse_top_tags(&body, max),
            None => Vec::new(),
        }
    }
}

pub fn parse_artist_info(body: &Value) -> ArtistInfo {
    let artist = &body["artist"];

    let genres = tag_names(&artist["tags"]["tag"], MAX_INFO_GENRES);
    // listeners arrives as a string ("12345"), occasionally as a number
    let listeners = match &artist["stats"]["listeners"] {
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    };

    ArtistInfo { genres, listeners }
}

pub fn parse_top_tags(body: &Value, max: usize) -> Vec<String> {
    tag_names(&body["toptags"]["tag"], max)
}

fn tag_names(tags: &Value, max: usize) -> Vec<String> {
    as_list(tags)
        .into_iter()
        .filter_map(|t| t["name"].as_str())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .take(max)
        .collect()
}
