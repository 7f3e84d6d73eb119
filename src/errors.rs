use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    NotAuthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("User already exists")]
    DuplicateUser { field: &'static str },
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    ServerError(&'static str),
}

/// True when the error is SQLite rejecting a duplicate value on a unique
/// column, so callers can surface it as a conflict instead of a 500.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            db_error.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, body) = match self {
            RequestError::Validation(message) => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            RequestError::NotAuthorized(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }
            RequestError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, json!({ "error": message }))
            }
            RequestError::NotFound(message) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            RequestError::Conflict(message) => {
                (StatusCode::CONFLICT, json!({ "error": message }))
            }
            RequestError::DuplicateUser { field } => (
                StatusCode::CONFLICT,
                json!({ "error": "User already exists", "field": field }),
            ),
            RequestError::DatabaseError(error) => {
                tracing::error!(%error, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            RequestError::ServerError(message) => {
                tracing::error!(message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };
        (status_code, Json(body)).into_response()
    }
}
