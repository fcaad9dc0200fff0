//! # API Module
//!
//! HTTP handlers of the dashboard server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - starts the Spotify OAuth 2.0 PKCE flow
//! - [`callback`] - exchanges the authorization code and opens the session
//! - [`logout`] - forgets the session and the user's cached token and dashboard
//!
//! ### Views
//!
//! - [`dashboard`] - the full page, anonymous or with the tracks view
//! - [`home`], [`tracks`], [`profile`], [`insights`] - HTML fragments swapped
//!   into the page by its navigation
//!
//! ### Data
//!
//! - [`sync`] - runs the enrichment pipeline in the background
//! - [`plot_file`] and [`user_plot_data`] - generated charts and their notes
//! - [`register`] - records an access request
//! - [`health`] - status and version
//!
//! Sessions live in memory and are bound to the browser with the
//! `listenlens_session` cookie, see [`session`].

mod auth;
mod health;
pub mod pages;
mod plots;
mod register;
pub mod session;
mod sync;
mod views;

use std::{collections::HashSet, sync::Arc};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use reqwest::Client;
use tokio::sync::Mutex;

pub use auth::{callback, login, logout};
pub use health::health;
pub use plots::{plot_content_type, plot_file, user_plot_data};
pub use register::register;
pub use sync::{SyncGuard, sync};
pub use views::{dashboard, ensure_cache, home, insights, profile, tracks};

use crate::{
    config::Settings,
    management::{DashboardCache, RegistrationStore, TokenStore, UserStore},
};
use session::SessionStore;

/// Shared state of every handler.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub http: Client,
    pub sessions: SessionStore,
    pub tokens: TokenStore,
    pub dashboards: DashboardCache,
    pub registrations: RegistrationStore,
    /// Users with a pipeline run in flight.
    pub syncing: Mutex<HashSet<String>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            http: Client::new(),
            sessions: SessionStore::new(),
            tokens: TokenStore::new(&settings.data_dir),
            dashboards: DashboardCache::new(&settings.data_dir, settings.cache_ttl),
            registrations: RegistrationStore::new(&settings.data_dir),
            syncing: Mutex::new(HashSet::new()),
            settings,
        }
    }

    pub fn user_store(&self, user_id: &str) -> UserStore {
        UserStore::new(&self.settings.data_dir, user_id)
    }
}

/// An HTML error page with `status`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Html(pages::error_page(message))).into_response()
}
