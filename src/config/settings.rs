//! Tunable settings loaded from config.toml.
//!
//! All values have working defaults, so the file is optional. Consumers wire
//! the hydration values into [`crate::store::BillStore::wait_for_hydration`]
//! and the form defaults into their input layer.

use crate::errors::{Error, Result};
use crate::validate::{DEFAULT_COLOR, DEFAULT_REMINDER_DAYS};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Configuration structure representing the config.toml file
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Reminder offset pre-filled in bill forms, days before the due date
    pub default_reminder_days: u8,
    /// Color pre-selected in bill forms
    pub default_color: String,
    /// Fixed interval between hydration-wait polls, in milliseconds
    pub hydration_poll_interval_ms: u64,
    /// Number of polls before the hydration wait gives up and forces the
    /// store into a usable state
    pub hydration_max_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_reminder_days: DEFAULT_REMINDER_DAYS,
            default_color: DEFAULT_COLOR.to_string(),
            hydration_poll_interval_ms: 100,
            hydration_max_attempts: 50,
        }
    }
}

impl Settings {
    /// The hydration poll interval as a [`Duration`].
    #[must_use]
    pub const fn hydration_poll_interval(&self) -> Duration {
        Duration::from_millis(self.hydration_poll_interval_ms)
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `./config.toml`, falling back to defaults when the
/// file does not exist.
#[must_use]
pub fn load_default_settings() -> Settings {
    match load_settings("config.toml") {
        Ok(settings) => settings,
        Err(e) => {
            info!("Using default settings ({e})");
            Settings::default()
        }
    }
}
