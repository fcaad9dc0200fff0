use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    Res,
    api::{self, AppState},
    config::Settings,
    info,
};

/// All dashboard routes on top of `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::dashboard))
        .route("/home", get(api::home))
        .route("/tracks", get(api::tracks))
        .route("/profile", get(api::profile))
        .route("/insights", get(api::insights))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/logout", get(api::logout))
        .route("/sync", post(api::sync))
        .route("/plots/{file}", get(api::plot_file))
        .route("/user_plot_data", get(api::user_plot_data))
        .route("/register", post(api::register))
        .route("/health", get(api::health))
        .with_state(state)
}

/// Binds `settings.server_address` and serves the dashboard until the
/// process ends.
pub async fn start_api_server(settings: Settings) -> Res<()> {
    let address = settings.server_address.clone();
    let app = router(Arc::new(AppState::new(settings)));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
