use std::time::Duration;

use listenlens::management::{
    Dataset, DashboardCache, PlotNotes, RegistrationStore, TokenStore, UserStore,
};
use listenlens::pipeline::{dedupe_tracks, unique_artists};
use listenlens::types::{
    DashboardTrack, SimilarSong, TrackRecord, UserDetails, parse_string_list,
};
use serde_json::json;
use tempfile::TempDir;

// Helper function to create a test dataset row
fn create_test_record(playlist: &str, name: &str, artist: &str) -> TrackRecord {
    TrackRecord {
        playlist: playlist.to_string(),
        name: name.to_string(),
        name_url: format!("https://open.spotify.com/track/{}", name),
        artist: artist.to_string(),
        artist_url: format!("https://open.spotify.com/artist/{}", artist),
        album: format!("{} album", name),
        album_url: String::new(),
        year: 2001,
        album_art: String::new(),
        genres: Vec::new(),
        playcount: None,
        similar_songs: None,
    }
}

fn create_test_user(id: &str) -> UserDetails {
    UserDetails {
        id: id.to_string(),
        name: Some("Test User".to_string()),
        total_playlists: 3,
        total_playlist_tracks: 42,
        ..Default::default()
    }
}

#[test]
fn test_parse_string_list() {
    assert_eq!(parse_string_list(r#"["rock","pop"]"#), vec!["rock", "pop"]);
    assert_eq!(
        parse_string_list("['hip hop', 'trap']"),
        vec!["hip hop", "trap"]
    );
    assert!(parse_string_list("[]").is_empty());
    assert!(parse_string_list("").is_empty());
    assert!(parse_string_list("not a list").is_empty());
}

#[tokio::test]
async fn test_dataset_roundtrip_keeps_enrichment_columns() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "alice");

    let mut first = create_test_record("Road Trip", "Song A", "Artist A");
    first.genres = vec!["indie rock".to_string(), "shoegaze".to_string()];
    first.playcount = Some(123_456);
    first.similar_songs = Some(vec![SimilarSong {
        name: "Song B".to_string(),
        artist: "Artist B".to_string(),
    }]);
    // no similar songs lookup for this one
    let second = create_test_record("Road Trip", "Song, with comma", "Artist \"Q\"");

    let path = store
        .write_tracks(Dataset::TopTracks, &[first.clone(), second.clone()])
        .await
        .unwrap();
    assert!(path.ends_with("alice/datasets/top_tracks.csv"));

    let rows = store.read_tracks(Dataset::TopTracks).await.unwrap().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], first);
    assert_eq!(rows[1].name, "Song, with comma");
    assert_eq!(rows[1].artist, "Artist \"Q\"");
    assert_eq!(rows[1].playcount, None);
    assert_eq!(rows[1].similar_songs, None);
}

#[tokio::test]
async fn test_dataset_without_enrichment_has_base_columns_only() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "bob");

    let path = store
        .write_tracks(
            Dataset::UserSongs,
            &[create_test_record("Chill", "Song", "Artist")],
        )
        .await
        .unwrap();

    let content = std::fs::read_to_string(path).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(
        header,
        "playlist,name,name_url,artist,artist_url,album,album_url,year,album_art,genres"
    );
}

#[tokio::test]
async fn test_read_missing_dataset_is_none() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "nobody");

    assert!(store.read_tracks(Dataset::RecentTracks).await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_tolerates_python_lists_and_float_years() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "carol");
    std::fs::create_dir_all(store.datasets_dir()).unwrap();
    std::fs::write(
        store.dataset_path(Dataset::UserSongs),
        "playlist,name,name_url,artist,artist_url,album,album_url,year,album_art,genres,playcount\n\
         Mix,Song,,Artist,,Album,,2019.0,,\"['hip-hop', 'rap']\",1500.0\n\
         Mix,Other,,Artist,,Album,,,,,\n",
    )
    .unwrap();

    let rows = store.read_tracks(Dataset::UserSongs).await.unwrap().unwrap();
    assert_eq!(rows[0].year, 2019);
    assert_eq!(rows[0].genres, vec!["hip-hop", "rap"]);
    assert_eq!(rows[0].playcount, Some(1500));

    assert_eq!(rows[1].year, 1900);
    assert!(rows[1].genres.is_empty());
    assert_eq!(rows[1].playcount, None);
}

#[tokio::test]
async fn test_user_details_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "dave");
    let details = create_test_user("dave");

    let path = store.save_details(&details).await.unwrap();
    assert!(path.ends_with("dave/user_details.json"));
    assert_eq!(store.load_details().await.unwrap(), details);
}

#[test]
fn test_dedupe_tracks_keeps_first() {
    let rows = vec![
        create_test_record("Top Tracks", "Song", "Artist"),
        create_test_record("Chill", "Song", "Artist"),
        create_test_record("Chill", "Song", "Other Artist"),
    ];

    let deduped = dedupe_tracks(rows);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].playlist, "Top Tracks");
    assert_eq!(deduped[1].artist, "Other Artist");
}

#[test]
fn test_unique_artists_in_order() {
    let rows = vec![
        create_test_record("A", "1", "Zed"),
        create_test_record("A", "2", ""),
        create_test_record("B", "3", "Amy"),
        create_test_record("B", "4", "Zed"),
    ];

    assert_eq!(unique_artists(&rows), vec!["Zed", "Amy"]);
}

#[tokio::test]
async fn test_token_store() {
    let dir = TempDir::new().unwrap();
    let tokens = TokenStore::new(dir.path());

    tokens.persist("erin", "token-123").await.unwrap();
    assert!(
        tokens
            .token_path("erin")
            .ends_with(".spotify_token_cache_erin.json")
    );
    assert_eq!(tokens.load("erin").await.unwrap(), "token-123");

    tokens.remove("erin").await.unwrap();
    assert!(tokens.load("erin").await.is_err());

    // Removing twice is fine
    tokens.remove("erin").await.unwrap();
}

#[tokio::test]
async fn test_dashboard_cache_ttl() {
    let dir = TempDir::new().unwrap();
    let user = create_test_user("frank");
    let top = vec![DashboardTrack {
        name: "Song".to_string(),
        artist: "Artist".to_string(),
        rank: Some(1),
        ..Default::default()
    }];

    let fresh = DashboardCache::new(dir.path(), Duration::from_secs(3600));
    let saved = fresh
        .persist("frank", &user, &top, &[], Some("tok"))
        .await
        .unwrap();
    assert_eq!(saved.access_token.as_deref(), Some("tok"));

    let loaded = fresh.load("frank").await.unwrap();
    assert_eq!(loaded.user, user);
    assert_eq!(loaded.top_tracks, top);
    assert!(loaded.recent_tracks.is_empty());

    // Same file, but every entry is already too old
    let expired = DashboardCache::new(dir.path(), Duration::ZERO);
    assert!(expired.load("frank").await.is_none());

    fresh.delete("frank").await.unwrap();
    assert!(fresh.load("frank").await.is_none());
}

#[tokio::test]
async fn test_plot_notes_merge() {
    let dir = TempDir::new().unwrap();
    let notes = PlotNotes::new(dir.path().join("plots"));

    assert_eq!(notes.load().await, json!({}));

    notes
        .record("wordcloud_genres", json!({ "summary": "a" }))
        .await
        .unwrap();
    notes
        .record("wordcloud_artists", json!({ "summary": "b" }))
        .await
        .unwrap();
    notes
        .record("wordcloud_genres", json!({ "summary": "c" }))
        .await
        .unwrap();

    assert_eq!(
        notes.load().await,
        json!({
            "wordcloud_genres": { "summary": "c" },
            "wordcloud_artists": { "summary": "b" }
        })
    );
}

#[tokio::test]
async fn test_registration_store_appends() {
    let dir = TempDir::new().unwrap();
    let registrations = RegistrationStore::new(dir.path());

    registrations
        .append(" grace@example.com ", "Grace")
        .await
        .unwrap();
    registrations.append("heidi@example.com", "Heidi").await.unwrap();

    let all = registrations.load().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].email, "grace@example.com");
    assert_eq!(all[1].username, "Heidi");
    assert!(!all[0].requested_at.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registration_store_concurrent_appends() {
    let dir = TempDir::new().unwrap();
    let registrations = RegistrationStore::new(dir.path());

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let store = registrations.clone();
            tokio::spawn(async move {
                store
                    .append(&format!("user{}@example.com", i), &format!("User {}", i))
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let all = registrations.load().await.unwrap();
    assert_eq!(all.len(), 20);
}

#[tokio::test]
async fn test_registration_store_keeps_unreadable_file() {
    let dir = TempDir::new().unwrap();
    let registrations = RegistrationStore::new(dir.path());
    std::fs::write(registrations.path(), "[{\"email\": \"tor").unwrap();

    assert!(registrations.load().await.is_err());
    assert!(registrations.append("ivy@example.com", "Ivy").await.is_err());
    assert_eq!(
        std::fs::read_to_string(registrations.path()).unwrap(),
        "[{\"email\": \"tor"
    );
}
