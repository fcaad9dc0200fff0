use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings, error, management::TokenStore, pipeline::Pipeline, success, warning,
};

/// Runs the whole pipeline for `user_id` with the token cached by the
/// dashboard login.
pub async fn sync(settings: Settings, user_id: &str) {
    let token = match TokenStore::new(&settings.data_dir).load(user_id).await {
        Ok(token) => token,
        Err(e) => error!(
            "No cached token for {}. Log in through the dashboard first.\n Error: {}",
            user_id, e
        ),
    };

    let pb = spinner(format!("Syncing {}...", user_id));
    let pipeline = Pipeline::from_settings(&settings, user_id, &token);
    let result = pipeline.run_full_sync().await;
    pb.finish_and_clear();

    match result {
        Ok(report) => {
            success!(
                "Synced {} playlists ({} tracks), {} top and {} recent tracks.",
                report.total_playlists,
                report.total_playlist_tracks,
                report.top_tracks,
                report.recent_tracks
            );
            if report.plots.is_empty() {
                warning!("No plots were generated.");
            }
            for plot in report.plots {
                success!("Plot saved to {}", plot.display());
            }
        }
        Err(e) => error!("Sync failed. Err: {}", e),
    }
}

pub(crate) fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
