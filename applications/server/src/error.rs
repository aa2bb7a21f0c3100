/// Server error types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use encore_core::EncoreError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body did not describe a valid ordering
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        invalid: Vec<String>,
        missing: Vec<String>,
        duplicates: Vec<String>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lock contention; the client should retry
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<EncoreError> for ServerError {
    fn from(err: EncoreError) -> Self {
        match err {
            EncoreError::Validation {
                message,
                invalid,
                missing,
                duplicates,
            } => ServerError::Validation {
                message,
                invalid,
                missing,
                duplicates,
            },
            e @ EncoreError::NotFound { .. } => ServerError::NotFound(e.to_string()),
            e @ EncoreError::DuplicateMember { .. } => ServerError::Conflict(e.to_string()),
            EncoreError::Concurrency(msg) => ServerError::Busy(msg),
            EncoreError::PermissionDenied(msg) => ServerError::Forbidden(msg),
            EncoreError::Storage(msg) => ServerError::Storage(msg),
        }
    }
}

impl From<encore_storage::StorageError> for ServerError {
    fn from(err: encore_storage::StorageError) -> Self {
        ServerError::from(EncoreError::from(err))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ServerError::Validation {
                message,
                invalid,
                missing,
                duplicates,
            } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": message,
                    "invalid": invalid,
                    "missing": missing,
                    "duplicates": duplicates,
                }),
            ),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ServerError::Busy(ref msg) => {
                tracing::warn!("Lock contention: {}", msg);
                let mut response = (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Container is busy, retry shortly" })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
                return response;
            }
            ServerError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Storage error" }),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Configuration error" }),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            ServerError::Jwt(ref e) => {
                tracing::error!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, json!({ "error": "Invalid token" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_statuses() {
        let cases = [
            (EncoreError::validation("bad order"), StatusCode::BAD_REQUEST),
            (EncoreError::not_found("Playlist", 1), StatusCode::NOT_FOUND),
            (
                EncoreError::duplicate_member("playlist 1", 2),
                StatusCode::CONFLICT,
            ),
            (
                EncoreError::Concurrency("lock wait".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                EncoreError::permission_denied("not yours"),
                StatusCode::FORBIDDEN,
            ),
            (
                EncoreError::storage("disk full"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = ServerError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn busy_sets_retry_after() {
        let response =
            ServerError::from(EncoreError::Concurrency("lock wait".into())).into_response();
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            &HeaderValue::from_static("1")
        );
    }
}
