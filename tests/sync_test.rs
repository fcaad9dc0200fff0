use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use listenlens::lastfm::LastFmClient;
use listenlens::management::Dataset;
use listenlens::management::UserStore;
use listenlens::pipeline::{Pipeline, PipelineOptions, RetryPolicy};
use serde_json::{Value, json};
use tempfile::TempDir;

fn spotify_track(name: &str, artist: &str, release_date: &str) -> Value {
    json!({
        "name": name,
        "external_urls": { "spotify": format!("https://open.spotify.com/track/{}", name) },
        "artists": [{ "name": artist }],
        "album": { "name": format!("{} album", artist), "release_date": release_date }
    })
}

fn lastfm_reply(params: &HashMap<String, String>) -> Value {
    let artist = params.get("artist").cloned().unwrap_or_default();
    match params.get("method").map(String::as_str) {
        Some("artist.getInfo") => {
            let (tags, listeners) = match artist.as_str() {
                "Artist A" => (vec!["rock", "indie"], "1000"),
                "Artist B" => (vec!["hip-hop"], "50000"),
                _ => (vec!["pop"], "300"),
            };
            let tags: Vec<Value> = tags.into_iter().map(|t| json!({ "name": t })).collect();
            json!({ "artist": { "stats": { "listeners": listeners }, "tags": { "tag": tags } } })
        }
        Some("artist.getTopTags") => {
            json!({ "toptags": { "tag": [{ "name": format!("tag-{}", artist) }] } })
        }
        Some("track.getSimilar") => {
            let track = params.get("track").cloned().unwrap_or_default();
            json!({ "similartracks": { "track": {
                "name": format!("like {}", track),
                "artist": { "name": "Somebody" }
            } } })
        }
        _ => json!({ "error": 3, "message": "Invalid Method" }),
    }
}

// One server standing in for both Spotify (/v1) and Last.fm (/2.0/)
async fn spawn_services() -> String {
    let app = Router::new()
        .route(
            "/v1/me",
            get(|| async { Json(json!({ "id": "uma", "display_name": "Uma", "country": "SE" })) }),
        )
        .route(
            "/v1/me/playlists",
            get(|| async {
                Json(json!({
                    "items": [{ "id": "p1", "name": "Road", "tracks": { "total": 2 } }],
                    "next": null,
                    "total": 1
                }))
            }),
        )
        .route(
            "/v1/playlists/{id}/tracks",
            get(|| async {
                Json(json!({
                    "items": [
                        { "track": spotify_track("Song A", "Artist A", "2010-04-01") },
                        { "track": spotify_track("Song B", "Artist B", "2015") }
                    ],
                    "next": null
                }))
            }),
        )
        .route(
            "/v1/me/top/tracks",
            get(|| async {
                Json(json!({ "items": [
                    spotify_track("Song A", "Artist A", "2010-04-01"),
                    spotify_track("Song C", "Artist C", "2020-01-01")
                ] }))
            }),
        )
        .route(
            "/v1/me/player/recently-played",
            get(|| async {
                Json(json!({ "items": [{ "track": spotify_track("Song B", "Artist B", "2015") }] }))
            }),
        )
        .route(
            "/2.0/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(lastfm_reply(&params))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

fn test_pipeline(base: &str, dir: &TempDir) -> Pipeline {
    Pipeline::new(
        listenlens::spotify::SpotifyClient::new(format!("{}/v1", base), "tok"),
        LastFmClient::new(
            format!("{}/2.0/", base),
            "key",
            RetryPolicy::fixed(1, Duration::ZERO),
        )
        .with_min_interval(Duration::ZERO),
        UserStore::new(dir.path(), "uma"),
        PipelineOptions::default(),
    )
}

#[tokio::test]
async fn test_run_full_sync() {
    let base = spawn_services().await;
    let dir = TempDir::new().unwrap();
    let pipeline = test_pipeline(&base, &dir);

    let report = pipeline.run_full_sync().await.unwrap();
    assert_eq!(report.total_playlists, 1);
    assert_eq!(report.total_playlist_tracks, 2);
    assert_eq!(report.top_tracks, 2);
    assert_eq!(report.recent_tracks, 1);
    // Song A and Song B appear twice across the datasets
    assert_eq!(report.enriched_rows, 3);
    assert_eq!(report.plots.len(), 5);

    let store = pipeline.store();
    let songs = store.read_tracks(Dataset::UserSongs).await.unwrap().unwrap();
    let by_name: HashMap<&str, _> = songs.iter().map(|r| (r.name.as_str(), r)).collect();
    assert_eq!(by_name["Song A"].playlist, "Road");
    assert_eq!(by_name["Song A"].genres, vec!["rock", "indie"]);
    assert_eq!(by_name["Song B"].playcount, Some(50_000));
    assert_eq!(by_name["Song C"].playlist, "Top Tracks");
    assert_eq!(by_name["Song C"].year, 2020);

    let top = store.read_tracks(Dataset::TopTracks).await.unwrap().unwrap();
    let similar = top[0].similar_songs.as_ref().unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].name, "like Song A");

    let details = store.load_details().await.unwrap();
    assert_eq!(details.id, "uma");
    assert_eq!(details.country.as_deref(), Some("Sweden"));
    assert_eq!(details.total_playlist_tracks, 2);

    assert!(store.plots_dir().join("network.html").is_file());
}

#[tokio::test]
async fn test_dashboard_tracks() {
    let base = spawn_services().await;
    let dir = TempDir::new().unwrap();
    let pipeline = test_pipeline(&base, &dir);

    let (top, recent) = pipeline.fetch_tracks_with_genres_and_similar().await.unwrap();

    assert_eq!(top.len(), 2);
    assert_eq!(top[0].rank, Some(1));
    assert_eq!(top[1].rank, Some(2));
    assert_eq!(top[1].genre, vec!["tag-Artist C"]);
    assert_eq!(top[0].similar_songs[0].name, "like Song A");

    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].rank, None);
    assert_eq!(recent[0].genre, vec!["tag-Artist B"]);
}

#[tokio::test]
async fn test_sync_fails_without_spotify() {
    let dir = TempDir::new().unwrap();
    let pipeline = test_pipeline("http://127.0.0.1:9", &dir);

    assert!(pipeline.run_full_sync().await.is_err());
    assert!(
        !pipeline
            .store()
            .dataset_path(Dataset::UserSongs)
            .exists()
    );
}

#[tokio::test]
async fn test_failing_playlist_contributes_no_tracks() {
    let bad_hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&bad_hits);
    let app = Router::new()
        .route(
            "/v1/me/playlists",
            get(|| async {
                Json(json!({
                    "items": [
                        { "id": "good", "name": "Good", "tracks": { "total": 2 } },
                        { "id": "bad", "name": "Broken", "tracks": { "total": 5 } }
                    ],
                    "next": null
                }))
            }),
        )
        .route(
            "/v1/playlists/{id}/tracks",
            get(move |Path(id): Path<String>| {
                let counter = Arc::clone(&counter);
                async move {
                    if id == "bad" {
                        counter.fetch_add(1, Ordering::SeqCst);
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                    Json(json!({
                        "items": [
                            { "track": spotify_track("Song A", "Artist A", "2010-04-01") },
                            { "track": spotify_track("Song B", "Artist B", "2015") }
                        ],
                        "next": null
                    }))
                    .into_response()
                }
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let dir = TempDir::new().unwrap();
    let pipeline = test_pipeline(&base, &dir);

    let (total_playlists, total_tracks) = pipeline.fetch_and_save_user_tracks().await.unwrap();
    assert_eq!(total_playlists, 2);
    assert_eq!(total_tracks, 7);
    // one try plus one retry
    assert_eq!(bad_hits.load(Ordering::SeqCst), 2);

    let songs = pipeline
        .store()
        .read_tracks(Dataset::UserSongs)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(songs.len(), 2);
    assert!(songs.iter().all(|r| r.playlist == "Good"));
}
