//! # Spotify Integration Module
//!
//! Everything that talks to Spotify:
//!
//! - [`auth`] - PKCE authorization URL and code-for-token exchange
//! - [`SpotifyClient`] - bearer-authenticated JSON GETs with retry on
//!   `429` (honoring `Retry-After`) and transient `5xx` gateway errors
//! - playlist, top-track and recently-played listing, with `next`-link
//!   pagination
//! - profile lookup and the user summary shown on the dashboard
//!
//! Responses are mapped defensively: every field is optional and falls back
//! to an empty string (or to 1900 for release years) when absent.

pub mod auth;
mod client;
mod tracks;
mod user;

pub use client::SpotifyClient;
pub use tracks::{dashboard_track, track_record};
pub use user::user_details;
