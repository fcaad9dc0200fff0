use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Map, Value};

use crate::management::PlotNotes;

use super::{SharedState, error_response};

/// Content type of a generated plot file, `None` for anything that is not one.
pub fn plot_content_type(file: &str) -> Option<&'static str> {
    if file.is_empty() || file.starts_with('.') || file.contains(['/', '\\']) {
        return None;
    }
    match file.rsplit_once('.').map(|(_, ext)| ext) {
        Some("svg") => Some("image/svg+xml"),
        Some("html") => Some("text/html; charset=utf-8"),
        Some("json") => Some("application/json"),
        _ => None,
    }
}

/// Serves a file from the plots directory of the logged-in user.
pub async fn plot_file(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(file): Path<String>,
) -> Response {
    let (_, session) = state.sessions.from_headers(&headers).await;
    let Some((user_id, _)) = session.credentials() else {
        return error_response(StatusCode::UNAUTHORIZED, "Log in to see your plots.");
    };
    let Some(content_type) = plot_content_type(&file) else {
        return error_response(StatusCode::NOT_FOUND, "No such plot.");
    };

    let path = state.user_store(user_id).plots_dir().join(&file);
    match async_fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(_) => error_response(StatusCode::NOT_FOUND, "No such plot."),
    }
}

/// `plot_expo.json` of the logged-in user, `{}` without a session or notes.
pub async fn user_plot_data(State(state): State<SharedState>, headers: HeaderMap) -> Json<Value> {
    let (_, session) = state.sessions.from_headers(&headers).await;
    match session.credentials() {
        Some((user_id, _)) => {
            Json(PlotNotes::new(state.user_store(user_id).plots_dir()).load().await)
        }
        None => Json(Value::Object(Map::new())),
    }
}
