mod auth;
mod dashboard;
mod datasets;
mod notes;
mod registration;

pub use auth::TokenStore;
pub use dashboard::DashboardCache;
pub use datasets::{Dataset, UserStore};
pub use notes::PlotNotes;
pub use registration::RegistrationStore;
