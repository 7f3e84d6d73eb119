use axum::http::StatusCode;
use axum::Json;

use crate::errors::RequestError;

mod article_handlers;
mod auth_handlers;
mod comment_handlers;
mod user_handlers;

pub use article_handlers::*;
pub use auth_handlers::*;
pub use comment_handlers::*;
pub use user_handlers::*;

pub(crate) type JsonResult<T> = Result<Json<T>, RequestError>;
pub(crate) type CreatedResult<T> = Result<(StatusCode, Json<T>), RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found() -> RequestError {
    RequestError::NotFound("Route not found")
}
