//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! 500-class bodies carry the underlying cause message for diagnostics; by
//! the time any of these surface, borrowed connections are already back in
//! the pool.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use rowboat_core::CursorError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Write rejected by a uniqueness constraint (400)
    UniqueViolation { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Cursor drain failed - open, read, or close (500, logged)
    Cursor(CursorError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::UniqueViolation { message } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "unique_violation",
                    "message": message
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "database_error",
                        "message": e.to_string()
                    }),
                )
            }
            Self::Cursor(e) => {
                tracing::error!("Cursor error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "cursor_error",
                        "message": e.to_string()
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::UniqueViolation { message } => Self::UniqueViolation { message },
            other => Self::Database(other),
        }
    }
}

impl From<CursorError> for ApiError {
    fn from(e: CursorError) -> Self {
        Self::Cursor(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unique_violation_is_400() {
        let err = ApiError::UniqueViolation {
            message: "email already exists".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::NotFound {
            resource: "record",
            id: "42".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cursor_failures_are_500() {
        for err in [
            CursorError::Open {
                source: sqlx::Error::Protocol("open failed".into()),
            },
            CursorError::Read {
                source: sqlx::Error::Protocol("fetch failed".into()),
            },
            CursorError::Close {
                source: sqlx::Error::Protocol("close failed".into()),
            },
        ] {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[tokio::test]
    async fn db_error_conversion_routes_by_kind() {
        let err = ApiError::from(DbError::NotFound {
            resource: "account",
            id: "7".into(),
        });
        assert!(matches!(err, ApiError::NotFound { .. }));

        let err = ApiError::from(DbError::UniqueViolation {
            message: "dup".into(),
        });
        assert!(matches!(err, ApiError::UniqueViolation { .. }));

        let err = ApiError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, ApiError::Database(_)));
    }
}
