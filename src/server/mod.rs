//! HTTP surface.

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::{SecretValidator, require_secret};
use crate::rag::RetrievalBinding;
use crate::session::SessionRepository;

pub use error::ApiError;
pub use routes::{AnswerResponse, AskRequest, AskStepsRequest};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionRepository>,
    pub binding: Arc<RetrievalBinding>,
}

/// Build the router. `/ask` and `/asksteps` sit behind the secret check;
/// `/health` does not.
pub fn router(state: AppState, validator: Arc<SecretValidator>) -> Router {
    let qa = Router::new()
        .route("/ask", post(routes::ask))
        .route("/asksteps", post(routes::ask_steps))
        .route_layer(middleware::from_fn_with_state(validator, require_secret));

    Router::new()
        .route("/health", get(routes::health))
        .merge(qa)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
