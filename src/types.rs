use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

/// Column order of the dataset CSV files. `playcount` and `similar_songs`
/// are appended once an enrichment pass has produced them.
pub const BASE_COLUMNS: [&str; 10] = [
    "playlist",
    "name",
    "name_url",
    "artist",
    "artist_url",
    "album",
    "album_url",
    "year",
    "album_art",
    "genres",
];

pub const TOP_TRACKS_PLAYLIST: &str = "Top Tracks";
pub const RECENT_TRACKS_PLAYLIST: &str = "Recent Tracks";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCache {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimilarSong {
    pub name: String,
    pub artist: String,
}

/// One row of a dataset CSV: a track seen in a playlist, the top tracks or
/// the recently played tracks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrackRecord {
    #[serde(default)]
    pub playlist: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_url: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub artist_url: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub album_url: String,
    #[serde(default = "default_year", deserialize_with = "lenient_year")]
    pub year: i32,
    #[serde(default)]
    pub album_art: String,
    #[serde(default, deserialize_with = "list_cell")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub playcount: Option<u64>,
    #[serde(default, deserialize_with = "optional_list_cell")]
    pub similar_songs: Option<Vec<SimilarSong>>,
}

impl TrackRecord {
    /// Key used to deduplicate rows across datasets.
    pub fn key(&self) -> (String, String) {
        (self.artist.clone(), self.name.clone())
    }

    pub fn csv_header(with_playcount: bool, with_similar: bool) -> Vec<&'static str> {
        let mut header = BASE_COLUMNS.to_vec();
        if with_playcount {
            header.push("playcount");
        }
        if with_similar {
            header.push("similar_songs");
        }
        header
    }

    pub fn csv_row(&self, with_playcount: bool, with_similar: bool) -> Vec<String> {
        let mut row = vec![
            self.playlist.clone(),
            self.name.clone(),
            self.name_url.clone(),
            self.artist.clone(),
            self.artist_url.clone(),
            self.album.clone(),
            self.album_url.clone(),
            self.year.to_string(),
            self.album_art.clone(),
            serde_json::to_string(&self.genres).unwrap_or_else(|_| "[]".to_string()),
        ];
        if with_playcount {
            row.push(self.playcount.map(|p| p.to_string()).unwrap_or_default());
        }
        if with_similar {
            row.push(match &self.similar_songs {
                Some(songs) => serde_json::to_string(songs).unwrap_or_default(),
                None => String::new(),
            });
        }
        row
    }
}

/// Track as shown on the dashboard's tracks view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardTrack {
    pub name: String,
    pub artist: String,
    pub artist_url: String,
    pub album: String,
    pub album_url: String,
    pub img: String,
    pub url: String,
    pub genre: Vec<String>,
    pub rank: Option<u32>,
    pub similar_songs: Vec<SimilarSong>,
}

/// Profile summary written to `user_details.json` and shown on the profile view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub img: String,
    pub country: Option<String>,
    pub product: Option<String>,
    pub spotify_link: String,
    pub total_playlists: u64,
    pub total_playlist_tracks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liked_songs: Option<u64>,
}

/// Everything the dashboard needs for one user, cached on disk with a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub timestamp: f64,
    pub user: UserDetails,
    pub top_tracks: Vec<DashboardTrack>,
    pub recent_tracks: Vec<DashboardTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// One line of a `stats` distribution table.
#[derive(Tabled)]
pub struct CountTableRow {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub requested_at: String,
}

// Spotify Web API payloads. Every field is optional or defaulted: responses are
// only trusted as far as the fields that are actually present.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackCount {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tracks: Option<TrackCount>,
}

impl PlaylistSummary {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Playlist")
    }

    pub fn track_total(&self) -> u64 {
        self.tracks.as_ref().map_or(0, |t| t.total)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

/// Item of a playlist page or of the recently-played history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub track: Option<SpotifyTrack>,
}

fn default_year() -> i32 {
    1900
}

fn lenient_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    // pandas writes integer columns with missing values as floats ("2019.0")
    Ok(raw
        .parse::<i32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f as i32))
        .unwrap_or_else(default_year))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(raw
        .parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f.max(0.0) as u64)))
}

fn list_cell<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(parse_string_list(&raw))
}

fn optional_list_cell<'de, D>(deserializer: D) -> Result<Option<Vec<SimilarSong>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(raw).unwrap_or_default()))
}

/// Parses a list cell written either as a JSON array (`["rock","pop"]`) or as
/// a Python list literal (`['rock', 'pop']`). Anything else yields an empty list.
pub fn parse_string_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }

    let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) else {
        return Vec::new();
    };
    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
