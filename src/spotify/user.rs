use crate::{
    countries,
    error::SpotifyError,
    types::{Paging, PlaylistSummary, Profile, UserDetails},
};

use super::SpotifyClient;

impl SpotifyClient {
    pub async fn me(&self) -> Result<Profile, SpotifyError> {
        self.get_json("me").await
    }

    /// Profile plus playlist, playlist-track and liked-song totals, as shown on
    /// the dashboard.
    ///
    /// Playlist paging stops quietly at the first failing page; the totals
    /// gathered so far are kept.
    pub async fn dashboard_profile(&self) -> Result<UserDetails, SpotifyError> {
        let profile = self.me().await?;

        let mut total_playlists = 0;
        let mut total_playlist_tracks = 0;
        let mut next = Some(self.endpoint("me/playlists?limit=50"));
        while let Some(url) = next {
            let page: Paging<PlaylistSummary> = match self.get_json(&url).await {
                Ok(page) => page,
                Err(_) => break,
            };
            total_playlists = page.total.unwrap_or(total_playlists + page.items.len() as u64);
            total_playlist_tracks += page.items.iter().map(|p| p.track_total()).sum::<u64>();
            next = page.next;
        }

        let liked = self.liked_total().await;
        let mut details = user_details(&profile, total_playlists, total_playlist_tracks)?;
        details.followers = Some(
            profile
                .followers
                .as_ref()
                .and_then(|f| f.total)
                .unwrap_or(0),
        );
        details.liked_songs = Some(liked);
        Ok(details)
    }
}

/// Flattens a profile into the persisted user summary.
///
/// # Errors
///
/// `SpotifyError::MissingField("id")` when the profile carries no user id.
pub fn user_details(
    profile: &Profile,
    total_playlists: u64,
    total_playlist_tracks: u64,
) -> Result<UserDetails, SpotifyError> {
    let id = profile
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or(SpotifyError::MissingField("id"))?;

    Ok(UserDetails {
        id,
        name: profile.display_name.clone(),
        email: profile.email.clone(),
        img: profile
            .images
            .first()
            .and_then(|i| i.url.clone())
            .unwrap_or_default(),
        country: profile.country.as_deref().map(|code| {
            countries::country_name(code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string())
        }),
        product: profile.product.clone(),
        spotify_link: profile
            .external_urls
            .as_ref()
            .and_then(|u| u.spotify.clone())
            .unwrap_or_default(),
        total_playlists,
        total_playlist_tracks,
        followers: None,
        liked_songs: None,
    })
}
