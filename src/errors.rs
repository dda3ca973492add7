//! Unified error types for `BillBuddy`.
//!
//! Validation and not-found errors surface to callers so UI forms can show
//! them; storage and notification failures are caught at their own layer,
//! logged, and never allowed into the mutation path (see the `store` and
//! `notify` modules).

use thiserror::Error;

/// All error conditions produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced bill id does not exist in the repository.
    #[error("Bill not found: {bill_id}")]
    NotFound {
        /// The id that failed to resolve
        bill_id: String,
    },

    /// Bill fields violated an invariant. Raised before any mutation.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Which input field was rejected
        field: &'static str,
        /// Human-readable reason, suitable for form display
        message: String,
    },

    /// A durable read or write failed. Callers at the write-through
    /// boundary log this and keep the in-memory state authoritative.
    #[error("Storage error: {message}")]
    Storage {
        /// Underlying failure description
        message: String,
    },

    /// Scheduling or canceling a reminder failed.
    #[error("Notification error: {message}")]
    Notification {
        /// Underlying failure description
        message: String,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// A period string was not of the canonical `YYYY-MM` form.
    #[error("Invalid period: {value}")]
    InvalidPeriod {
        /// The rejected input
        value: String,
    },
}

impl From<sea_orm::DbErr> for Error {
    fn from(value: sea_orm::DbErr) -> Self {
        Error::Storage {
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Storage {
            message: format!("serialization failed: {value}"),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
