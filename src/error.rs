//! Error types for connection settings.

use uuid::Uuid;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures reading or writing the persisted settings document.
///
/// A failed save never rolls back the in-memory change that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to read settings from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to move unreadable settings {path} aside: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings backend failed: {0}")]
    Backend(String),
}

/// Errors from connection store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection profile {id} not found")]
    ProfileNotFound { id: Uuid },

    #[error("No connection profile matches '{reference}'")]
    UnknownProfile { reference: String },

    #[error("'{prefix}' matches {matches} connection profiles; use a longer id")]
    AmbiguousProfile { prefix: String, matches: usize },

    #[error("Change kept in memory but not saved: {0}")]
    Persistence(#[from] PersistenceError),
}
