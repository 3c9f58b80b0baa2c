//! HTTP API handlers for koimatch-bot

pub mod crush;
pub mod health;
pub mod message;
pub mod register;

pub use crush::post_crush;
pub use health::health_routes;
pub use message::post_message;
pub use register::post_register;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use koimatch_common::Error;
use serde_json::json;
use tracing::error;

/// Maps engine errors onto HTTP responses.
///
/// Validation and domain-rule violations become 4xx with a stable
/// `code`; storage failures become a generic 500 without internals.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            Error::SelfDeclaration => (
                StatusCode::BAD_REQUEST,
                "self_declaration",
                self.0.to_string(),
            ),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg.clone()),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            _ => {
                error!("Request failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "code": code,
            "error": message,
        }));

        (status, body).into_response()
    }
}
