pub mod config;
pub mod routes;

pub use config::Config;
pub use routes::{build_router, AppState};
