use crate::{charts, config::Settings, error, management::UserStore, success};

use super::sync::spinner;

/// Regenerates every plot from the stored datasets of `user_id`.
pub async fn plots(settings: Settings, user_id: &str) {
    let store = UserStore::new(&settings.data_dir, user_id);

    let pb = spinner(format!("Rendering plots for {}...", user_id));
    let result = charts::generate_all_user_plots(&store).await;
    pb.finish_and_clear();

    match result {
        Ok(paths) => {
            for path in &paths {
                success!("Plot saved to {}", path.display());
            }
        }
        Err(e) => error!("Cannot render plots. Err: {}", e),
    }
}
