pub mod config;
pub mod error;
pub mod extract;
pub mod file_logging;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::AppState;
