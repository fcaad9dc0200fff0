use std::collections::HashMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use listenlens::lastfm::*;
use listenlens::pipeline::RetryPolicy;
use listenlens::types::SimilarSong;
use serde_json::{Value, json};

// Starts a fake Last.fm endpoint and returns its base url.
async fn spawn_mock(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/2.0/", addr)
}

fn test_client(url: &str, attempts: u32) -> LastFmClient {
    LastFmClient::new(url, "test-key", RetryPolicy::fixed(attempts, Duration::ZERO))
        .with_min_interval(Duration::ZERO)
}

#[test]
fn test_parse_artist_info() {
    let body = json!({
        "artist": {
            "name": "Röyksopp",
            "stats": { "listeners": "1523412", "playcount": "9000000" },
            "tags": { "tag": [
                { "name": "electronic" },
                { "name": "chillout" },
                { "name": " " },
                { "name": "ambient" },
                { "name": "norwegian" }
            ] }
        }
    });

    let info = parse_artist_info(&body);
    assert_eq!(info.genres, vec!["electronic", "chillout", "ambient"]);
    assert_eq!(info.listeners, 1_523_412);
}

#[test]
fn test_parse_artist_info_single_tag_and_numeric_listeners() {
    // A single tag arrives as an object, not a list
    let body = json!({
        "artist": {
            "stats": { "listeners": 42 },
            "tags": { "tag": { "name": "polka" } }
        }
    });

    let info = parse_artist_info(&body);
    assert_eq!(info.genres, vec!["polka"]);
    assert_eq!(info.listeners, 42);

    assert_eq!(parse_artist_info(&json!({})), ArtistInfo::default());
}

#[test]
fn test_parse_top_tags() {
    let body = json!({ "toptags": { "tag": [
        { "name": "rock", "count": 100 },
        { "name": "indie", "count": 60 },
        { "name": "alternative", "count": 40 }
    ] } });

    assert_eq!(parse_top_tags(&body, 2), vec!["rock", "indie"]);
    assert!(parse_top_tags(&json!({ "toptags": {} }), 3).is_empty());
}

#[test]
fn test_parse_similar_tracks() {
    let body = json!({ "similartracks": { "track": [
        { "name": "Karma Police", "artist": { "name": "Radiohead" } },
        { "name": "Unnamed" },
        { "name": "Third", "artist": { "name": "Someone" } }
    ] } });

    let similar = parse_similar_tracks(&body, 2);
    assert_eq!(
        similar,
        vec![
            SimilarSong {
                name: "Karma Police".to_string(),
                artist: "Radiohead".to_string(),
            },
            SimilarSong {
                name: "Unnamed".to_string(),
                artist: "Unknown".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_artist_info_retries_server_errors() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/2.0/",
            get(
                |State(hits): State<Arc<AtomicUsize>>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        return StatusCode::SERVICE_UNAVAILABLE.into_response();
                    }
                    assert_eq!(params.get("api_key").map(String::as_str), Some("test-key"));
                    assert_eq!(params.get("format").map(String::as_str), Some("json"));
                    Json(json!({
                        "artist": {
                            "name": params.get("artist").cloned().unwrap_or_default(),
                            "stats": { "listeners": "77" },
                            "tags": { "tag": [{ "name": "shoegaze" }] }
                        }
                    }))
                    .into_response()
                },
            ),
        )
        .with_state(Arc::clone(&hits));
    let url = spawn_mock(app).await;

    let info = test_client(&url, 3).artist_info("Slowdive").await;

    assert_eq!(info.genres, vec!["shoegaze"]);
    assert_eq!(info.listeners, 77);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_artist_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/2.0/",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "error": 6, "message": "The artist you supplied could not be found" }))
            }),
        )
        .with_state(Arc::clone(&hits));
    let url = spawn_mock(app).await;

    let info = test_client(&url, 3).artist_info("Nobody").await;

    assert_eq!(info, ArtistInfo::default());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_api_errors_exhaust_retries() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/2.0/",
            get(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "error": 29, "message": "Rate limit exceeded" }))
            }),
        )
        .with_state(Arc::clone(&hits));
    let url = spawn_mock(app).await;

    let similar = test_client(&url, 2)
        .similar_tracks("Radiohead", "Creep", 3)
        .await;

    assert!(similar.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_similar_tracks_sends_query() {
    let app = Router::new().route(
        "/2.0/",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let body: Value = if params.get("method").map(String::as_str) == Some("track.getSimilar")
                && params.get("track").map(String::as_str) == Some("Creep")
                && params.get("limit").map(String::as_str) == Some("1")
            {
                json!({ "similartracks": { "track": [
                    { "name": "High and Dry", "artist": { "name": "Radiohead" } },
                    { "name": "Extra", "artist": { "name": "Ignored" } }
                ] } })
            } else {
                json!({ "similartracks": { "track": [] } })
            };
            Json(body)
        }),
    );
    let url = spawn_mock(app).await;

    let similar = test_client(&url, 1)
        .similar_tracks("Radiohead", "Creep", 1)
        .await;

    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].name, "High and Dry");
}
