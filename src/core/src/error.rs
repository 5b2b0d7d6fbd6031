//! Unified error types for the Helio broker
//!
//! Subsystem crates define their own error enums; this central type exists
//! for callers (the HTTP layer, jobs) that need one conversion target.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for the Helio broker
#[derive(Debug, Error)]
pub enum CoreError {
    /// Clearance check failed; never retried
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Referenced entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// External credential failed verification
    #[error("Invalid credential")]
    InvalidCredential,

    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a permission-denied error
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        CoreError::PermissionDenied(msg.into())
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        CoreError::NotFound(msg.into())
    }

    /// Create a store error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        CoreError::Store(msg.into())
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        CoreError::Configuration(msg.into())
    }
}
