//! Error types for the clearance engine

use helio_core::CharacterId;
use thiserror::Error;

/// Result type for clearance operations
pub type Result<T> = std::result::Result<T, ClearanceError>;

/// Clearance engine errors
#[derive(Debug, Error)]
pub enum ClearanceError {
    /// Clearance check failed. Surfaced as an authorization failure and
    /// never retried.
    #[error("Permission denied: {subject} lacks clearance for scope '{scope}'")]
    PermissionDenied {
        /// Subject that failed the check
        subject: CharacterId,
        /// Scope that was checked
        scope: String,
    },

    /// Referenced organizational entity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistent store error
    #[error("Store error: {0}")]
    Store(String),
}

impl From<ClearanceError> for helio_core::CoreError {
    fn from(err: ClearanceError) -> Self {
        match err {
            ClearanceError::PermissionDenied { .. } => {
                helio_core::CoreError::PermissionDenied(err.to_string())
            }
            ClearanceError::NotFound(msg) => helio_core::CoreError::NotFound(msg),
            ClearanceError::Store(msg) => helio_core::CoreError::Store(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClearanceError::PermissionDenied {
            subject: CharacterId(42),
            scope: "helio.write_group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Permission denied: 42 lacks clearance for scope 'helio.write_group'"
        );
    }

    #[test]
    fn test_core_error_conversion() {
        let err = ClearanceError::NotFound("corporation 7".to_string());
        let core: helio_core::CoreError = err.into();
        assert!(matches!(core, helio_core::CoreError::NotFound(_)));
    }
}
