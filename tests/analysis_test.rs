use listenlens::analysis::*;
use listenlens::error::StoreError;
use listenlens::management::{Dataset, UserStore};
use listenlens::types::TrackRecord;
use tempfile::TempDir;

fn create_test_record(
    playlist: &str,
    artist: &str,
    album: &str,
    year: i32,
    genres: &[&str],
    playcount: Option<u64>,
) -> TrackRecord {
    TrackRecord {
        playlist: playlist.to_string(),
        name: format!("{} song", artist),
        artist: artist.to_string(),
        album: album.to_string(),
        year,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        playcount,
        ..Default::default()
    }
}

#[test]
fn test_normalize_genres() {
    let genres: Vec<String> = ["Hip-Hop", " rock ", "hip hop", "", "rock", "HIP HOP"]
        .iter()
        .map(|g| g.to_string())
        .collect();

    assert_eq!(normalize_genres(&genres), vec!["hip hop", "rock"]);
}

#[test]
fn test_prepare_rows_drops_unusable_rows() {
    let mut nameless = create_test_record("P", "Artist", "Album", 2000, &["rock"], Some(1));
    nameless.name = String::new();

    let rows = vec![
        create_test_record("P", "Kept", "Album", 2000, &["Hip-Hop"], Some(10)),
        create_test_record("P", "", "Album", 2000, &["rock"], Some(10)),
        nameless,
        create_test_record("P", "No count", "Album", 2000, &["rock"], None),
        create_test_record("P", "No genre", "Album", 2000, &[" "], Some(10)),
    ];

    let prepared = prepare_rows(rows);
    assert_eq!(prepared.len(), 1);
    assert_eq!(prepared[0].artist, "Kept");
    assert_eq!(prepared[0].genres, vec!["hip hop"]);
}

#[test]
fn test_value_counts_orders_by_count_then_first_seen() {
    let counts = value_counts(["a", "b", "b", "c", "a", "d", "d", "d"]);

    assert_eq!(counts, vec![("d", 3), ("a", 2), ("b", 2), ("c", 1)]);
}

#[test]
fn test_distributions() {
    let rows = vec![
        create_test_record("Chill", "Nils", "Spaces", 2013, &["ambient", "piano"], Some(5)),
        create_test_record("Chill", "Nils", "", 2013, &["piano"], Some(15)),
        create_test_record("Run", "Moby", "Play", 1999, &["electronic"], Some(40)),
    ];

    assert_eq!(
        genre_distribution(&rows),
        vec![
            ("piano".to_string(), 2),
            ("ambient".to_string(), 1),
            ("electronic".to_string(), 1)
        ]
    );
    assert_eq!(artist_distribution(&rows, 1), vec![("Nils".to_string(), 2)]);
    // rows without an album are not counted
    assert_eq!(
        album_distribution(&rows, 10),
        vec![("Spaces".to_string(), 1), ("Play".to_string(), 1)]
    );
    assert_eq!(
        playlist_distribution(&rows),
        vec![("Chill".to_string(), 2), ("Run".to_string(), 1)]
    );
    assert_eq!(year_distribution(&rows), vec![(1999, 1), (2013, 2)]);
}

#[test]
fn test_playcount_stats() {
    let rows = vec![
        create_test_record("P", "A", "X", 2000, &["rock"], Some(10)),
        create_test_record("P", "B", "X", 2000, &["rock"], Some(30)),
        create_test_record("P", "C", "X", 2000, &["rock"], None),
    ];

    let stats = playcount_stats(&rows).unwrap();
    assert_eq!(stats.max, 30);
    assert_eq!(stats.min, 10);
    assert!((stats.mean - 20.0).abs() < f64::EPSILON);

    assert!(playcount_stats(&rows[2..]).is_none());
}

#[tokio::test]
async fn test_load_user_data_without_datasets() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "empty");

    let result = load_user_data(&store).await;
    assert!(matches!(result, Err(StoreError::NoDatasets(_))));
}

#[tokio::test]
async fn test_load_user_data_merges_and_cleans() {
    let dir = TempDir::new().unwrap();
    let store = UserStore::new(dir.path(), "merge");

    store
        .write_tracks(
            Dataset::TopTracks,
            &[create_test_record("Top Tracks", "A", "X", 2001, &["rock"], Some(3))],
        )
        .await
        .unwrap();
    store
        .write_tracks(
            Dataset::UserSongs,
            &[
                create_test_record("Mix", "B", "Y", 2002, &["hip-hop"], Some(7)),
                create_test_record("Mix", "C", "Z", 2003, &[], Some(7)),
            ],
        )
        .await
        .unwrap();

    let rows = load_user_data(&store).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].artist, "A");
    assert_eq!(rows[1].genres, vec!["hip hop"]);
}
