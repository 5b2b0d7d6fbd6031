//! Error types for the token lifecycle

use helio_clearance::ClearanceError;
use thiserror::Error;

/// Result type for token operations
pub type Result<T> = std::result::Result<T, TokenError>;

/// Token lifecycle errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Clearance check failed; surfaced as an authorization failure
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Referenced token or state code absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// External token representation failed verification. The specific check
    /// that failed is logged, never exposed.
    #[error("Invalid credential")]
    InvalidCredential,

    /// Persistent store error
    #[error("Store error: {0}")]
    Store(String),

    /// Claims serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ClearanceError> for TokenError {
    fn from(err: ClearanceError) -> Self {
        match err {
            ClearanceError::PermissionDenied { .. } => TokenError::PermissionDenied(err.to_string()),
            ClearanceError::NotFound(msg) => TokenError::NotFound(msg),
            ClearanceError::Store(msg) => TokenError::Store(msg),
        }
    }
}

impl From<TokenError> for helio_core::CoreError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::PermissionDenied(msg) => helio_core::CoreError::PermissionDenied(msg),
            TokenError::NotFound(msg) => helio_core::CoreError::NotFound(msg),
            TokenError::InvalidCredential => helio_core::CoreError::InvalidCredential,
            TokenError::Store(msg) => helio_core::CoreError::Store(msg),
            TokenError::Serialization(err) => helio_core::CoreError::Serialization(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helio_core::CharacterId;

    #[test]
    fn test_clearance_error_conversion() {
        let err: TokenError = ClearanceError::PermissionDenied {
            subject: CharacterId(1),
            scope: "helio.write_dyn_token".to_string(),
        }
        .into();
        assert!(matches!(err, TokenError::PermissionDenied(_)));
    }

    #[test]
    fn test_invalid_credential_is_opaque() {
        // The Display form must not leak which verification check failed.
        assert_eq!(TokenError::InvalidCredential.to_string(), "Invalid credential");
    }
}
