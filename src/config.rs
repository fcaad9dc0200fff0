//! Configuration management for the listenlens dashboard.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/listenlens/.env`)
//! 4. Defaults for everything that is not a credential
//!
//! [`Settings::from_env`] reads everything once; the rest of the crate passes
//! the resulting struct around instead of reading the environment again.

use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::ConfigError;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_SCOPE: &str =
    "user-read-private user-read-email user-top-read user-read-recently-played";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_LASTFM_API_URL: &str = "https://ws.audioscrobbler.com/2.0/";
pub const DEFAULT_DATA_DIR: &str = "temp";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Loads `.env` files into the process environment.
///
/// Both files are optional. Variables that are already set are never
/// overwritten, so the working-directory file wins over the data-directory one.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or if either
/// file exists but cannot be read or parsed.
pub async fn load_env() -> Result<(), String> {
    optional_env(dotenv::dotenv(), ".env")?;

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("listenlens/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }
    load_env_file(&path)?;

    Ok(())
}

/// Loads a single `.env` file. Returns `false` when there is no such file.
///
/// # Errors
///
/// Returns an error for a file that exists but is unreadable or malformed.
///
/// # Example
///
/// ```ignore
/// use listenlens::config::load_env_file;
///
/// if load_env_file(std::path::Path::new("deploy/.env"))? {
///     println!("loaded deploy settings");
/// }
/// ```
pub fn load_env_file(path: &Path) -> Result<bool, String> {
    optional_env(dotenv::from_path(path), path.display())
}

fn optional_env<T>(result: dotenv::Result<T>, source: impl Display) -> Result<bool, String> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(format!("Cannot load {}: {}", source, e)),
    }
}

/// Runtime settings for the server, the API clients and the storage layer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_address: String,
    pub spotify_client_id: String,
    pub spotify_redirect_uri: String,
    pub spotify_scope: String,
    pub spotify_auth_url: String,
    pub spotify_token_url: String,
    pub spotify_api_url: String,
    pub lastfm_api_key: String,
    pub lastfm_api_url: String,
    pub data_dir: PathBuf,
    pub cache_ttl: Duration,
}

impl Settings {
    /// Builds the settings from the current process environment.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Missing` when a credential variable is unset or empty
    /// - `ConfigError::Invalid` when `LISTENLENS_CACHE_TTL` is not a number
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let cache_ttl = match get("LISTENLENS_CACHE_TTL") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::Invalid {
                    name: "LISTENLENS_CACHE_TTL",
                    message: e.to_string(),
                })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            server_address: or_default("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            spotify_client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            spotify_redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            spotify_scope: or_default("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            spotify_auth_url: or_default("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            spotify_token_url: or_default("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            spotify_api_url: or_default("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            lastfm_api_key: required("LASTFM_API_KEY")?,
            lastfm_api_url: or_default("LASTFM_API_URL", DEFAULT_LASTFM_API_URL),
            data_dir: PathBuf::from(or_default("LISTENLENS_DATA_DIR", DEFAULT_DATA_DIR)),
            cache_ttl: Duration::from_secs(cache_ttl),
        })
    }
}
