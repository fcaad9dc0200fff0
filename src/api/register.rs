use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{info, warning};

use super::{SharedState, error_response, pages};

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
}

/// Appends an access request to `registrations.json`.
pub async fn register(State(state): State<SharedState>, Form(form): Form<RegisterForm>) -> Response {
    let email = form.email.trim();
    let username = form.username.trim();
    if username.is_empty() || !email.contains('@') {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Please provide a name and a valid email address.",
        );
    }

    match state.registrations.append(email, username).await {
        Ok(registration) => {
            info!("[Register] Access requested by {}", registration.email);
            Html(pages::registered_fragment(&registration.username)).into_response()
        }
        Err(e) => {
            warning!("[Register] Cannot record request: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not record your request.",
            )
        }
    }
}
