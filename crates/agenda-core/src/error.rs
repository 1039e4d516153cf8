//! Core error types for agenda-core.
//!
//! This module defines the error hierarchy using thiserror. Planning errors
//! raised by an external strategy are absorbed by the fallback path and
//! never reach callers of [`crate::scheduler::AgendaPlanner`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for agenda-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// External planning strategy errors
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A block handed to `replace_agenda` belongs to someone else
    #[error("Agenda block {block_id} is owned by '{owner}', not '{user_id}'")]
    ForeignBlock {
        block_id: String,
        owner: String,
        user_id: String,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),
}

/// Validation errors.
///
/// Raised for malformed planning input before the scheduler runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Horizon outside `(0, max]`
    #[error("Horizon must be greater than 0 and at most {max} hours, got {value}")]
    HorizonOutOfRange { value: f64, max: f64 },

    /// Estimated hours must be a positive, finite number
    #[error("Project '{project_id}' has invalid estimated hours: {value}")]
    InvalidEstimate { project_id: String, value: f64 },

    /// Unknown energy tier name
    #[error("Unknown energy level '{0}' (expected low, medium or high)")]
    UnknownEnergy(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors from an external planning strategy.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// The strategy did not answer within its time budget
    #[error("External planner timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Network or transport failure
    #[error("External planner request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("External planner returned HTTP {0}")]
    Status(u16),

    /// The proposal violated the planning contract
    #[error("External planner returned a malformed agenda: {0}")]
    Malformed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::UnknownEnergy("turbo".into()).into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("turbo"));
    }

    #[test]
    fn timeout_message_names_budget() {
        let err = PlannerError::Timeout { timeout_ms: 50 };
        assert_eq!(err.to_string(), "External planner timed out after 50 ms");
    }
}
