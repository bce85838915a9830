//! services/shell/src/error.rs
//!
//! Defines the primary error type for the application shell.

use crate::config::ConfigError;
use growify_core::ports::PortError;

/// The primary error type for the `shell` service.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a failure to encode or decode a bridge message.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g. reading stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

pub type ShellResult<T> = Result<T, ShellError>;
