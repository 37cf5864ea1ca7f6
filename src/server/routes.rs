//! Q&A endpoints: `/ask`, `/asksteps` and `/health`.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::AppState;
use super::error::ApiError;
use crate::config::DEFAULT_SESSION_ID;
use crate::intake::StepOutcome;

/// Body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Body of `POST /asksteps`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskStepsRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
}

/// Successful reply: a model answer, an intake prompt, or a correction.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Trimmed question, or `EmptyInput` if there is nothing to work with.
fn require_input(question: Option<&str>) -> Result<&str, ApiError> {
    match question.map(str::trim) {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(ApiError::EmptyInput),
    }
}

/// POST /ask
///
/// Stateless question answering.
pub async fn ask(
    State(state): State<AppState>,
    Json(body): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    require_input(body.question.as_deref())?;
    let question = body.question.unwrap_or_default();

    let answer = state.binding.answer(&question).await?;
    Ok(Json(AnswerResponse { answer }))
}

/// POST /asksteps
///
/// Runs the intake dialogue for the session until it is complete, then
/// answers questions like `/ask`.
pub async fn ask_steps(
    State(state): State<AppState>,
    Json(body): Json<AskStepsRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let input = require_input(body.question.as_deref())?;
    let session_id = body
        .session_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID);

    let handle = state.sessions.get_or_create(session_id).await;
    {
        let mut session = handle.lock().await;
        session.touch();

        if let Some(outcome) = session.intake.advance(input) {
            let kind = match &outcome {
                StepOutcome::Advanced { .. } => "advanced",
                StepOutcome::Rejected { .. } => "rejected",
                StepOutcome::Completed { .. } => "completed",
            };
            info!(
                session_id = %session_id,
                step = session.intake.step(),
                outcome = kind,
                "Intake step"
            );
            if let StepOutcome::Completed { record, .. } = &outcome {
                info!(
                    session_id = %session_id,
                    adjusted_amount = %record.adjusted_amount(),
                    filing_status = %record.filing_status,
                    "Intake complete"
                );
            }
            return Ok(Json(AnswerResponse {
                answer: outcome.message().to_string(),
            }));
        }
    }

    debug!(session_id = %session_id, "Intake complete, answering question");
    let answer = state.binding.answer(input).await?;
    Ok(Json(AnswerResponse { answer }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "faq-assist",
        "retrieval": state.binding.status().await,
        "sessions": state.sessions.len().await,
    }))
}
