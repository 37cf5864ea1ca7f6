//! HTTP error responses.
//!
//! Retrieval failures are logged in full here and reach the caller only as
//! a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::error::RetrievalError;
use crate::intake::prompts::EMPTY_INPUT;

/// Failures a Q&A handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("empty input")]
    EmptyInput,

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::EmptyInput => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "answer": EMPTY_INPUT })),
            )
                .into_response(),
            Self::Retrieval(e) => {
                error!(error = %e, detail = ?e, "Error processing request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Error processing request" })),
                )
                    .into_response()
            }
        }
    }
}
