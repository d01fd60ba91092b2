//! Error types for the key-value server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the store and its HTTP surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key not present in the store
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Caller supplied an empty key
    #[error("Store key not specified")]
    KeyNotSpecified,

    /// Mutation attempted by someone who neither owns the key nor is an administrator
    #[error("Owner not authorised to update value: {0}")]
    UnauthorizedOwner(String),

    /// The store actor has stopped and no longer answers requests
    #[error("Store is closed")]
    StoreClosed,

    /// PUT without a body
    #[error("Store value not specified")]
    ValueNotSpecified,

    /// No Authorization header on a secure route
    #[error("Authorization header missing")]
    AuthorizationHeaderMissing,

    /// Authorization header present but unparseable
    #[error("Invalid authorization header")]
    InvalidAuthorizationHeader,

    /// Bad credentials or an invalid token
    #[error("Authorization failed")]
    AuthorizationFailed,

    /// Token signing failed
    #[error("Error creating the token: {0}")]
    TokenCreation(String),
}

impl StoreError {
    /// HTTP status code this error surfaces as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            StoreError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::UnauthorizedOwner(_) => StatusCode::FORBIDDEN,
            StoreError::AuthorizationHeaderMissing => StatusCode::FORBIDDEN,
            StoreError::AuthorizationFailed => StatusCode::UNAUTHORIZED,
            StoreError::InvalidAuthorizationHeader
            | StoreError::KeyNotSpecified
            | StoreError::ValueNotSpecified => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::StoreClosed => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::TokenCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the store.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StoreError::KeyNotFound("k".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::UnauthorizedOwner("bob".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            StoreError::KeyNotSpecified.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            StoreError::AuthorizationFailed.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            StoreError::StoreClosed.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_response_carries_message() {
        let response = StoreError::KeyNotFound("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
