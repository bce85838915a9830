//! crates/growify_core/src/ports.rs
//!
//! Defines the service contracts (traits) the application core depends on.
//! These traits form the boundary of the hexagonal architecture, so the core
//! never knows whether values end up in a file, a browser, or a test map.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage failure: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A string key/value store with the semantics of browser local storage:
/// writes overwrite, the last write wins, and a missing key reads as `None`.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> PortResult<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing a key that does not exist is not an error.
    async fn remove_item(&self, key: &str) -> PortResult<()>;
}

/// Source of "now" for timestamps such as `lastWatched`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
