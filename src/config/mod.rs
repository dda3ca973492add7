//! Application configuration.

/// Database configuration and connection management
pub mod database;

/// Tunable settings loaded from config.toml
pub mod settings;

use tracing::info;

/// Loads a `.env` file if one exists. Non-fatal: environment variables can
/// also be set externally. Call once, before opening connections.
pub fn load_env() {
    if dotenvy::dotenv().is_ok() {
        info!("Loaded environment from .env file");
    }
}
