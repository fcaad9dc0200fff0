use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    info,
    spotify::{SpotifyClient, auth},
    utils, warning,
};

use super::{
    SharedState, error_response,
    session::{Session, removal_cookie, session_cookie},
};

/// Starts the PKCE flow: a fresh verifier goes into a newly issued session,
/// the browser goes to Spotify's authorize page with the matching challenge.
///
/// A session id sent by the client is never reused.
pub async fn login(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let (Some(previous), _) = state.sessions.from_headers(&headers).await {
        state.sessions.remove(&previous).await;
    }
    let id = utils::generate_session_id();

    let verifier = utils::generate_code_verifier();
    let challenge = utils::generate_code_challenge(&verifier);
    let url = match auth::build_authorize_url(&state.settings, &challenge) {
        Ok(url) => url,
        Err(e) => {
            warning!("[OAuth] Cannot build authorize url: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login is misconfigured.",
            );
        }
    };

    state
        .sessions
        .update(&id, |s| s.code_verifier = Some(verifier))
        .await;
    info!("[OAuth] Redirecting to Spotify authorization");

    (
        [(header::SET_COOKIE, session_cookie(&id))],
        Redirect::to(&url),
    )
        .into_response()
}

/// Completes the PKCE flow.
///
/// Without a code or a verifier in the session the browser is sent back to
/// `/`. The access token and user id land in a session under a fresh id,
/// the pre-login id is dropped, and the token is cached on disk for the CLI.
pub async fn callback(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (id, session) = state.sessions.from_headers(&headers).await;
    let (Some(id), Some(code), Some(verifier)) =
        (id, params.get("code"), session.code_verifier.clone())
    else {
        return Redirect::to("/").into_response();
    };

    let token = match auth::exchange_code(&state.http, &state.settings, code, &verifier).await {
        Ok(token) => token,
        Err(e) => {
            warning!("[OAuth] Token exchange failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to get access token: {}", e),
            );
        }
    };

    let client = SpotifyClient::with_http(
        state.http.clone(),
        &state.settings.spotify_api_url,
        &token,
    );
    let user_id = match client.me().await.map(|p| p.id.filter(|id| !id.is_empty())) {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not retrieve user ID from Spotify",
            );
        }
        Err(e) => {
            warning!("[OAuth] Profile lookup failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to fetch user info: {}", e),
            );
        }
    };

    state.sessions.remove(&id).await;
    let fresh = utils::generate_session_id();
    state
        .sessions
        .insert(
            &fresh,
            Session {
                code_verifier: None,
                access_token: Some(token.clone()),
                user_id: Some(user_id.clone()),
            },
        )
        .await;
    if let Err(e) = state.tokens.persist(&user_id, &token).await {
        warning!("[OAuth] Cannot cache token for {}: {}", user_id, e);
    }

    info!("[OAuth] {} logged in", user_id);
    (
        [(header::SET_COOKIE, session_cookie(&fresh))],
        Redirect::to("/"),
    )
        .into_response()
}

/// Forgets the session plus the user's cached token and dashboard data.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (id, session) = state.sessions.from_headers(&headers).await;

    if let Some(user_id) = session.user_id.as_deref() {
        if let Err(e) = state.tokens.remove(user_id).await {
            warning!("[OAuth] Cannot remove token cache of {}: {}", user_id, e);
        }
        if let Err(e) = state.dashboards.delete(user_id).await {
            warning!("[OAuth] Cannot remove dashboard cache of {}: {}", user_id, e);
        }
        info!("[OAuth] {} logged out", user_id);
    }
    if let Some(id) = id {
        state.sessions.remove(&id).await;
    }

    (
        [(header::SET_COOKIE, removal_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
