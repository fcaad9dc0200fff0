//! # Charts
//!
//! Every chart is a pure function from the cleaned rows (see
//! [`crate::analysis::load_user_data`]) to a [`Plot`]: the rendered file plus a
//! short JSON explanation. [`generate_all_user_plots`] writes the files into
//! the user's `plots/` directory and merges the explanations into
//! `plot_expo.json`, which feeds the dashboard's bar charts.
//!
//! Charts are SVG with a transparent background and the rainbow color map.
//! The network graph is an HTML page driving vis-network.

mod kde;
mod network;
mod polar;
pub mod svg;
mod wordcloud;

use std::path::{Path, PathBuf};

use serde_json::Value;

pub use kde::{Ribbons, fill_ribbons, gaussian_kde, playcount_distribution, scott_bandwidth};
pub use network::{Graph, GraphEdge, GraphNode, artist_genre_playlist_network, build_graph};
pub use polar::{polar_playcount_playlist, year_angle};
pub use wordcloud::{PlacedWord, layout_words, wordcloud_artists, wordcloud_genres};

use crate::{
    analysis,
    error::{PlotError, StoreError},
    info,
    management::{PlotNotes, UserStore},
    success,
    types::TrackRecord,
    warning,
};

/// A rendered chart ready to be written.
#[derive(Debug, Clone)]
pub struct Plot {
    /// Key of the explanation in `plot_expo.json`.
    pub name: &'static str,
    pub file_name: &'static str,
    pub content: String,
    pub explanation: Value,
}

/// Writes `plot` into `plots_dir` and records its explanation.
pub async fn save_plot(plots_dir: &Path, notes: &PlotNotes, plot: Plot) -> Result<PathBuf, PlotError> {
    async_fs::create_dir_all(plots_dir)
        .await
        .map_err(StoreError::from)?;
    let path = plots_dir.join(plot.file_name);
    async_fs::write(&path, plot.content)
        .await
        .map_err(StoreError::from)?;
    notes.record(plot.name, plot.explanation).await?;
    Ok(path)
}

/// Renders every chart from the user's stored datasets.
///
/// Loading the data is fatal; a single chart that has nothing to draw is
/// logged and skipped. Returns the paths written.
pub async fn generate_all_user_plots(store: &UserStore) -> Result<Vec<PathBuf>, PlotError> {
    let rows = analysis::load_user_data(store).await?;
    if rows.is_empty() {
        return Err(PlotError::Empty("no rows with genres and playcounts"));
    }
    info!("[Plots] Rendering plots from {} rows", rows.len());

    let plots_dir = store.plots_dir();
    let notes = PlotNotes::new(&plots_dir);
    let renderers: [fn(&[TrackRecord]) -> Result<Plot, PlotError>; 5] = [
        wordcloud_genres,
        wordcloud_artists,
        playcount_distribution,
        artist_genre_playlist_network,
        polar_playcount_playlist,
    ];

    let mut written = Vec::new();
    for render in renderers {
        match render(&rows) {
            Ok(plot) => written.push(save_plot(&plots_dir, &notes, plot).await?),
            Err(e) => warning!("[Plots] Skipped a plot: {}", e),
        }
    }

    success!("[Plots] All plots saved in {}", plots_dir.display());
    Ok(written)
}
