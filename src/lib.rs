//! listenlens: a personal Spotify listening dashboard.
//!
//! The library authenticates a user against Spotify with the OAuth 2.0 PKCE
//! flow, pulls playlists, top tracks and recently played tracks, enriches every
//! track with Last.fm genre tags and similar-track suggestions, stores the
//! results as flat CSV/JSON files and renders charts and HTML views on top.
//!
//! # Modules
//!
//! - `analysis` - Distributions and cleanup over the stored datasets
//! - `api` - HTTP handlers of the dashboard server
//! - `charts` - SVG word clouds, KDE ribbon, polar scatter and network graph
//! - `cli` - Command-line entry points
//! - `config` - Environment driven settings
//! - `error` - Typed error enums per concern
//! - `lastfm` - Last.fm metadata client
//! - `management` - Flat-file persistence (tokens, caches, datasets, notes)
//! - `pipeline` - The concurrent fetch-and-enrich pipeline
//! - `server` - Router construction and serving
//! - `spotify` - Spotify Web API client and PKCE helpers
//! - `types` - Data structures shared across modules
//! - `utils` - Small helpers (PKCE material, HTML escaping, dates)

pub mod analysis;
pub mod api;
pub mod charts;
pub mod cli;
pub mod config;
pub mod countries;
pub mod error;
pub mod lastfm;
pub mod management;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for glue code that may fail in many ways.
///
/// Uses a boxed dynamic error with `Send + Sync` bounds so it can cross
/// `tokio::spawn` boundaries.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// ```
/// info!("Fetching {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal start-up failures in the binary. Library code returns
/// errors instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used by the pipeline for per-item failures that are logged and skipped.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
