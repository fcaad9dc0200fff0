use crate::{config::Settings, error, server::start_api_server, warning};

/// Runs the dashboard server, optionally opening it in the default browser.
pub async fn serve(settings: Settings, open: bool) {
    let url = format!("http://{}", settings.server_address);

    let server = tokio::spawn(async move { start_api_server(settings).await });

    if open && webbrowser::open(&url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        )
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Dashboard server stopped. Err: {}", e),
        Err(e) => error!("Dashboard server crashed. Err: {}", e),
    }
}
