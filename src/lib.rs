pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use app_state::AppState;
pub use config::Config;
