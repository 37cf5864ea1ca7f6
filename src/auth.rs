//! Shared-secret check for the Q&A endpoints.
//!
//! Every request to `/ask` and `/asksteps` must carry the configured secret
//! in the `x-chatbot-secret` header. The check runs as middleware, before
//! the body is parsed and before any session or retrieval work.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::config::SECRET_HEADER;
use crate::server::error::ApiError;

/// Compares a claimed secret against the configured one.
#[derive(Debug, Clone)]
pub struct SecretValidator {
    expected: Option<SecretString>,
}

impl SecretValidator {
    /// `None` means no secret is configured: every request is rejected.
    pub fn new(expected: Option<SecretString>) -> Self {
        Self { expected }
    }

    /// Whether `claimed` matches. Missing on either side is a mismatch.
    pub fn authorize(&self, claimed: Option<&str>) -> bool {
        match (&self.expected, claimed) {
            (Some(expected), Some(claimed)) => {
                bool::from(expected.expose_secret().as_bytes().ct_eq(claimed.as_bytes()))
            }
            _ => false,
        }
    }
}

/// Rejects requests without the right `x-chatbot-secret` header.
pub async fn require_secret(
    State(validator): State<Arc<SecretValidator>>,
    request: Request,
    next: Next,
) -> Response {
    let claimed = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|h| h.to_str().ok());

    if validator.authorize(claimed) {
        return next.run(request).await;
    }

    warn!(
        path = %request.uri().path(),
        header_present = claimed.is_some(),
        "Rejected request with bad secret"
    );
    ApiError::Unauthorized.into_response()
}
