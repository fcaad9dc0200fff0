use crate::{
    error::SpotifyError,
    types::{
        DashboardTrack, Paging, PlaylistSummary, RECENT_TRACKS_PLAYLIST, SpotifyTrack,
        TOP_TRACKS_PLAYLIST, TrackItem, TrackRecord,
    },
    utils,
};

use super::SpotifyClient;

impl SpotifyClient {
    /// All playlists of the current user, following `next` links until the
    /// last page.
    pub async fn playlists(&self) -> Result<Vec<PlaylistSummary>, SpotifyError> {
        let mut playlists = Vec::new();
        let mut next = Some(self.endpoint("me/playlists?limit=50"));

        while let Some(url) = next {
            let page: Paging<PlaylistSummary> = self.get_json(&url).await?;
            playlists.extend(page.items);
            next = page.next;
        }

        Ok(playlists)
    }

    /// Tracks of one playlist as dataset rows.
    ///
    /// Pages of 100 are requested until the playlist ends or `max_tracks`
    /// rows were collected. Items without a track object (removed or local
    /// tracks) are skipped.
    pub async fn playlist_tracks(
        &self,
        playlist: &PlaylistSummary,
        max_tracks: Option<usize>,
    ) -> Result<Vec<TrackRecord>, SpotifyError> {
        let name = playlist.display_name();
        let limit_reached = |n: usize| max_tracks.is_some_and(|max| n >= max);

        let mut tracks = Vec::new();
        let mut next = Some(self.endpoint(&format!(
            "playlists/{}/tracks?limit=100",
            playlist.id
        )));

        while let Some(url) = next {
            if limit_reached(tracks.len()) {
                break;
            }

            let page: Paging<TrackItem> = self.get_json(&url).await?;
            for item in page.items {
                let Some(track) = item.track else { continue };
                tracks.push(track_record(&track, name));
                if limit_reached(tracks.len()) {
                    break;
                }
            }

            next = page.next;
        }

        Ok(tracks)
    }

    pub async fn top_tracks(&self, limit: u32) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let page: Paging<SpotifyTrack> = self
            .get_json(&format!("me/top/tracks?limit={limit}"))
            .await?;
        Ok(page.items)
    }

    pub async fn recent_tracks(&self, limit: u32) -> Result<Vec<SpotifyTrack>, SpotifyError> {
        let page: Paging<TrackItem> = self
            .get_json(&format!("me/player/recently-played?limit={limit}"))
            .await?;
        Ok(page.items.into_iter().filter_map(|i| i.track).collect())
    }

    pub async fn top_track_records(&self, limit: u32) -> Result<Vec<TrackRecord>, SpotifyError> {
        Ok(self
            .top_tracks(limit)
            .await?
            .iter()
            .map(|t| track_record(t, TOP_TRACKS_PLAYLIST))
            .collect())
    }

    pub async fn recent_track_records(&self, limit: u32) -> Result<Vec<TrackRecord>, SpotifyError> {
        Ok(self
            .recent_tracks(limit)
            .await?
            .iter()
            .map(|t| track_record(t, RECENT_TRACKS_PLAYLIST))
            .collect())
    }

    /// Number of saved ("liked") tracks, `0` when the request fails.
    pub async fn liked_total(&self) -> u64 {
        match self.get_json::<Paging<serde_json::Value>>("me/tracks?limit=1").await {
            Ok(page) => page.total.unwrap_or(0),
            Err(_) => 0,
        }
    }
}

/// Maps an API track to a dataset row.
pub fn track_record(track: &SpotifyTrack, playlist: &str) -> TrackRecord {
    let artist = track.artists.first();
    let album = track.album.as_ref();

    TrackRecord {
        playlist: playlist.to_string(),
        name: track.name.clone().unwrap_or_default(),
        name_url: spotify_url(track.external_urls.as_ref()),
        artist: artist.and_then(|a| a.name.clone()).unwrap_or_default(),
        artist_url: spotify_url(artist.and_then(|a| a.external_urls.as_ref())),
        album: album.and_then(|a| a.name.clone()).unwrap_or_default(),
        album_url: spotify_url(album.and_then(|a| a.external_urls.as_ref())),
        year: utils::release_year(album.and_then(|a| a.release_date.as_deref())),
        album_art: album
            .and_then(|a| a.images.first())
            .and_then(|i| i.url.clone())
            .unwrap_or_default(),
        genres: Vec::new(),
        playcount: None,
        similar_songs: None,
    }
}

/// Maps an API track to the shape rendered by the tracks view.
pub fn dashboard_track(track: &SpotifyTrack, rank: Option<u32>) -> DashboardTrack {
    let artist = track.artists.first();
    let album = track.album.as_ref();

    DashboardTrack {
        name: track.name.clone().unwrap_or_default(),
        artist: artist.and_then(|a| a.name.clone()).unwrap_or_default(),
        artist_url: spotify_url(artist.and_then(|a| a.external_urls.as_ref())),
        album: album.and_then(|a| a.name.clone()).unwrap_or_default(),
        album_url: spotify_url(album.and_then(|a| a.external_urls.as_ref())),
        img: album
            .and_then(|a| a.images.first())
            .and_then(|i| i.url.clone())
            .unwrap_or_default(),
        url: spotify_url(track.external_urls.as_ref()),
        genre: Vec::new(),
        rank,
        similar_songs: Vec::new(),
    }
}

fn spotify_url(urls: Option<&crate::types::ExternalUrls>) -> String {
    urls.and_then(|u| u.spotify.clone()).unwrap_or_default()
}
