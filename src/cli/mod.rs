//! # CLI Module
//!
//! Command-line entry points of listenlens. Each command loads what it needs
//! from the settings and the data directory, reports progress with spinners
//! and the logging macros, and exits through [`crate::error!`] on fatal
//! failures.
//!
//! - [`serve`] - runs the dashboard server
//! - [`sync`] - runs the enrichment pipeline for a user who logged in through
//!   the dashboard (uses the cached access token)
//! - [`plots`] - regenerates the charts from the stored datasets
//! - [`stats`] - prints distributions of the stored datasets as tables
//!
//! ```bash
//! listenlens serve --open
//! listenlens sync --user <spotify-user-id>
//! listenlens stats --user <spotify-user-id> --top 15
//! ```

mod plots;
mod serve;
mod stats;
mod sync;

pub use plots::plots;
pub use serve::serve;
pub use stats::stats;
pub use sync::sync;
