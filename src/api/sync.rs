use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{pipeline::Pipeline, success, warning};

use super::SharedState;

/// Marks a user as syncing for as long as it lives.
///
/// The mark is released on drop, so a run that fails or panics never leaves
/// the user locked out of the next sync.
#[derive(Debug)]
pub struct SyncGuard {
    state: SharedState,
    user_id: String,
}

impl SyncGuard {
    /// `None` when a run for `user_id` is already in flight.
    pub async fn acquire(state: &SharedState, user_id: &str) -> Option<Self> {
        if !state.syncing.lock().await.insert(user_id.to_string()) {
            return None;
        }
        Some(Self {
            state: Arc::clone(state),
            user_id: user_id.to_string(),
        })
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        let user_id = std::mem::take(&mut self.user_id);
        if let Ok(mut running) = self.state.syncing.try_lock() {
            running.remove(&user_id);
            return;
        }
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let state = Arc::clone(&self.state);
            runtime.spawn(async move {
                state.syncing.lock().await.remove(&user_id);
            });
        }
    }
}

/// Starts a full pipeline run for the logged-in user in the background.
///
/// `202` when started, `409` while a run for the same user is in flight and
/// `401` without a session.
pub async fn sync(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (_, session) = state.sessions.from_headers(&headers).await;
    let Some((user_id, token)) = session.credentials() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "status": "error", "message": "Log in first." })),
        )
            .into_response();
    };
    let user_id = user_id.to_string();

    let Some(guard) = SyncGuard::acquire(&state, &user_id).await else {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "status": "running", "message": "A sync is already running." })),
        )
            .into_response();
    };

    let pipeline = Pipeline::from_settings(&state.settings, &user_id, token);
    let background = state.clone();
    tokio::spawn(async move {
        let _guard = guard;
        match pipeline.run_full_sync().await {
            Ok(report) => success!(
                "[Sync] {} synced: {} playlist tracks, {} plots",
                user_id,
                report.total_playlist_tracks,
                report.plots.len()
            ),
            Err(e) => warning!("[Sync] Sync of {} failed: {}", user_id, e),
        }
        // drop the stale dashboard so the next view reflects the new data
        if let Err(e) = background.dashboards.delete(&user_id).await {
            warning!("[Sync] Cannot reset dashboard cache of {}: {}", user_id, e);
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "started", "message": "Sync started." })),
    )
        .into_response()
}
