use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use listenlens::config::*;
use listenlens::error::ConfigError;

fn required_vars() -> HashMap<&'static str, String> {
    HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client".to_string()),
        (
            "SPOTIFY_API_REDIRECT_URI",
            "http://127.0.0.1:5000/callback".to_string(),
        ),
        ("LASTFM_API_KEY", "key".to_string()),
    ])
}

fn settings_from(vars: &HashMap<&'static str, String>) -> Result<Settings, ConfigError> {
    Settings::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn test_defaults() {
    let settings = settings_from(&required_vars()).unwrap();

    assert_eq!(settings.server_address, DEFAULT_SERVER_ADDRESS);
    assert_eq!(settings.spotify_client_id, "client");
    assert_eq!(settings.spotify_scope, DEFAULT_SCOPE);
    assert_eq!(settings.spotify_auth_url, DEFAULT_AUTH_URL);
    assert_eq!(settings.spotify_token_url, DEFAULT_TOKEN_URL);
    assert_eq!(settings.spotify_api_url, DEFAULT_API_URL);
    assert_eq!(settings.lastfm_api_url, DEFAULT_LASTFM_API_URL);
    assert_eq!(settings.data_dir, PathBuf::from("temp"));
    assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
}

#[test]
fn test_overrides() {
    let mut vars = required_vars();
    vars.insert("SERVER_ADDRESS", "0.0.0.0:8080".to_string());
    vars.insert("SPOTIFY_API_URL", "http://localhost:9000/v1/".to_string());
    vars.insert("LISTENLENS_DATA_DIR", "/var/lib/listenlens".to_string());
    vars.insert("LISTENLENS_CACHE_TTL", " 60 ".to_string());

    let settings = settings_from(&vars).unwrap();
    assert_eq!(settings.server_address, "0.0.0.0:8080");
    // trailing slash is dropped
    assert_eq!(settings.spotify_api_url, "http://localhost:9000/v1");
    assert_eq!(settings.data_dir, PathBuf::from("/var/lib/listenlens"));
    assert_eq!(settings.cache_ttl, Duration::from_secs(60));
}

#[test]
fn test_missing_credentials() {
    let mut vars = required_vars();
    vars.remove("LASTFM_API_KEY");
    assert!(matches!(
        settings_from(&vars),
        Err(ConfigError::Missing("LASTFM_API_KEY"))
    ));

    // Blank counts as unset
    let mut vars = required_vars();
    vars.insert("SPOTIFY_API_AUTH_CLIENT_ID", "   ".to_string());
    assert!(matches!(
        settings_from(&vars),
        Err(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"))
    ));
}

#[test]
fn test_invalid_cache_ttl() {
    let mut vars = required_vars();
    vars.insert("LISTENLENS_CACHE_TTL", "an hour".to_string());

    match settings_from(&vars) {
        Err(ConfigError::Invalid { name, .. }) => assert_eq!(name, "LISTENLENS_CACHE_TTL"),
        other => panic!("expected an invalid ttl, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_load_env_file() {
    let dir = tempfile::TempDir::new().unwrap();

    // Missing files are skipped
    assert_eq!(load_env_file(&dir.path().join(".env")), Ok(false));

    let good = dir.path().join("good.env");
    std::fs::write(&good, "LISTENLENS_TEST_FROM_FILE=loaded\n").unwrap();
    assert_eq!(load_env_file(&good), Ok(true));
    assert_eq!(
        std::env::var("LISTENLENS_TEST_FROM_FILE").as_deref(),
        Ok("loaded")
    );

    let broken = dir.path().join("broken.env");
    std::fs::write(&broken, "NOT A VALID LINE\n").unwrap();
    let err = load_env_file(&broken).unwrap_err();
    assert!(err.contains("broken.env"));
}
