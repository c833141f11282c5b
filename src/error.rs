//! Error types for dev-janitor operations.
//!
//! This module defines [`JanitorError`], the error type used below the
//! orchestrator boundary, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Handlers and the process boundary return `Result<T>` with `JanitorError`
//! - Output parsing never fails; malformed input yields fewer records
//! - The orchestrator converts every error into an empty list, `false`, or a
//!   `not_installed` status, so nothing here reaches the UI layer as a failure
//! - Use `anyhow::Error` (via `JanitorError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for dev-janitor operations.
#[derive(Debug, Error)]
pub enum JanitorError {
    /// External command could not be spawned or exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External command exceeded its invocation timeout and was killed.
    #[error("Command timed out after {timeout:?}: {command}")]
    CommandTimedOut { command: String, timeout: Duration },

    /// Package manager executable could not be resolved by any tier.
    #[error("Package manager '{manager}' is not available")]
    ManagerUnavailable { manager: String },

    /// Manager identifier is not one of the supported managers.
    #[error("Unknown package manager: {name}")]
    UnknownManager { name: String },

    /// Custom configuration file exists but could not be parsed.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// The manager has no primitive for the requested operation.
    #[error("'{operation}' is not supported by {manager}")]
    UnsupportedOperation { manager: String, operation: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for dev-janitor operations.
pub type Result<T> = std::result::Result<T, JanitorError>;
