pub mod app;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Settings;
pub use state::AppState;
pub use storage::load_profile;
