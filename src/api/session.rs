use std::{collections::HashMap, sync::Arc};

use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite};
use tokio::sync::RwLock;

pub const SESSION_COOKIE: &str = "listenlens_session";

/// Server-side state of one browser session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// PKCE verifier between `/login` and `/callback`.
    pub code_verifier: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
}

impl Session {
    /// (user id, access token) once the user went through `/callback`.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user_id, &self.access_token) {
            (Some(user), Some(token)) => Some((user.as_str(), token.as_str())),
            _ => None,
        }
    }
}

/// In-memory session store keyed by the session cookie. Sessions do not
/// survive a restart.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn insert(&self, id: &str, session: Session) {
        self.sessions.write().await.insert(id.to_string(), session);
    }

    /// Applies `change` to the session, creating it when missing.
    pub async fn update<F>(&self, id: &str, change: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        change(sessions.entry(id.to_string()).or_default());
    }

    pub async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }

    /// The session id from the request cookie and its session (empty when
    /// unknown).
    pub async fn from_headers(&self, headers: &HeaderMap) -> (Option<String>, Session) {
        let Some(id) = session_id(headers) else {
            return (None, Session::default());
        };
        let session = self.get(&id).await.unwrap_or_default();
        (Some(id), session)
    }
}

/// Reads the session id out of the `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// `Set-Cookie` value binding the browser to session `id`.
pub fn session_cookie(id: &str) -> String {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

/// `Set-Cookie` value that drops the session cookie.
pub fn removal_cookie() -> String {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie.to_string()
}
