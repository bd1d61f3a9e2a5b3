//! Gateway error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// An error reported by the underlying object store.
///
/// Opaque by design: the store's original message is carried through
/// verbatim so it survives the trip across the operation boundary.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(String);

impl StoreError {
    /// Wrap any displayable error or message
    pub fn new(message: impl ToString) -> Self {
        Self(message.to_string())
    }

    /// The original store message
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or empty input, detected before any store call
    #[error("invalid request: {0}")]
    Validation(String),

    /// Object absent or soft-deleted
    #[error("object '{key}' not found in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    /// Any underlying store or network failure
    #[error("storage operation failed: {0}")]
    Operation(#[from] StoreError),
}

impl GatewayError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for an object
    pub fn not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_keeps_store_message() {
        let store = StoreError::new("connection reset by peer");
        let err = GatewayError::from(store);
        assert_eq!(
            err.to_string(),
            "storage operation failed: connection reset by peer"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = GatewayError::not_found("media", "cover.png");
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "object 'cover.png' not found in bucket 'media'"
        );
    }
}
