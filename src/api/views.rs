use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use futures::StreamExt;

use crate::{
    info,
    management::PlotNotes,
    pipeline::Pipeline,
    spotify::SpotifyClient,
    types::DashboardSnapshot,
    warning,
};

use super::{
    AppState, SharedState,
    pages::{self, DefaultView},
    session::removal_cookie,
};

/// Dashboard data for the user, from the cache while it is fresh.
///
/// Otherwise the profile (with playlist and liked-song totals) and the
/// enriched top and recent tracks are fetched and cached. `None` when the
/// profile cannot be fetched, which usually means the token expired. A
/// failing track fetch leaves both track lists empty and skips the cache.
pub async fn ensure_cache(state: &AppState, user_id: &str, token: &str) -> Option<DashboardSnapshot> {
    if let Some(cached) = state.dashboards.load(user_id).await {
        return Some(cached);
    }

    let client = SpotifyClient::with_http(
        state.http.clone(),
        &state.settings.spotify_api_url,
        token,
    );
    let user = match client.dashboard_profile().await {
        Ok(user) => user,
        Err(e) => {
            warning!("[Dashboard] Cannot fetch profile of {}: {}", user_id, e);
            return None;
        }
    };

    info!("[Dashboard] Refreshing dashboard data of {}", user_id);
    let pipeline = Pipeline::from_settings(&state.settings, user_id, token);
    let (top_tracks, recent_tracks) = match pipeline.fetch_tracks_with_genres_and_similar().await {
        Ok(tracks) => tracks,
        Err(e) => {
            warning!("[Dashboard] Cannot fetch tracks of {}: {}", user_id, e);
            return Some(DashboardSnapshot {
                timestamp: Utc::now().timestamp() as f64,
                user,
                top_tracks: Vec::new(),
                recent_tracks: Vec::new(),
                access_token: None,
            });
        }
    };

    match state
        .dashboards
        .persist(user_id, &user, &top_tracks, &recent_tracks, Some(token))
        .await
    {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warning!("[Dashboard] Cannot cache dashboard of {}: {}", user_id, e);
            Some(DashboardSnapshot {
                timestamp: Utc::now().timestamp() as f64,
                user,
                top_tracks,
                recent_tracks,
                access_token: Some(token.to_string()),
            })
        }
    }
}

/// The snapshot of the logged-in user.
///
/// The second value is true when the session was dropped because its token
/// no longer works.
async fn session_snapshot(state: &AppState, headers: &HeaderMap) -> (Option<DashboardSnapshot>, bool) {
    let (id, session) = state.sessions.from_headers(headers).await;
    let Some((user_id, token)) = session.credentials() else {
        return (None, false);
    };

    match ensure_cache(state, user_id, token).await {
        Some(snapshot) => (Some(snapshot), false),
        None => {
            if let Some(id) = id {
                state.sessions.remove(&id).await;
            }
            (None, true)
        }
    }
}

fn respond(html: String, dropped_session: bool) -> Response {
    if dropped_session {
        ([(header::SET_COOKIE, removal_cookie())], Html(html)).into_response()
    } else {
        Html(html).into_response()
    }
}

pub async fn dashboard(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (snapshot, dropped) = session_snapshot(&state, &headers).await;
    let html = match &snapshot {
        Some(snapshot) => pages::dashboard_page(Some(&snapshot.user), DefaultView::Tracks),
        None => pages::dashboard_page(None, DefaultView::Home),
    };
    respond(html, dropped)
}

pub async fn home(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (snapshot, dropped) = session_snapshot(&state, &headers).await;
    respond(
        pages::home_fragment(snapshot.as_ref().map(|s| &s.user)),
        dropped,
    )
}

pub async fn tracks(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (snapshot, dropped) = session_snapshot(&state, &headers).await;
    let html = match &snapshot {
        Some(s) => pages::tracks_fragment(&s.top_tracks, &s.recent_tracks),
        None => pages::tracks_fragment(&[], &[]),
    };
    respond(html, dropped)
}

pub async fn profile(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (snapshot, dropped) = session_snapshot(&state, &headers).await;
    respond(
        pages::profile_fragment(snapshot.as_ref().map(|s| &s.user)),
        dropped,
    )
}

/// Generated charts of the logged-in user with their explanations.
pub async fn insights(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (snapshot, dropped) = session_snapshot(&state, &headers).await;
    let Some(snapshot) = snapshot else {
        return respond(
            pages::insights_fragment(None, &serde_json::Value::Null, &[]),
            dropped,
        );
    };

    let plots_dir = state.user_store(&snapshot.user.id).plots_dir();
    let notes = PlotNotes::new(&plots_dir).load().await;

    let mut plots = Vec::new();
    if let Ok(mut entries) = async_fs::read_dir(&plots_dir).await {
        while let Some(Ok(entry)) = entries.next().await {
            plots.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    plots.sort();

    respond(
        pages::insights_fragment(Some(&snapshot.user), &notes, &plots),
        dropped,
    )
}
