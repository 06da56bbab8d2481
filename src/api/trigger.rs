//! Trigger endpoints. Each call runs under its own `run` span.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::AppState;
use crate::error::AppError;
use crate::orchestration::GuardOutcome;

pub const SUCCESS_MESSAGE: &str = "Script executed successfully";

/// Response body shared by both triggers.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    pub message: String,
}

impl Envelope {
    fn from_outcome<T>(outcome: &GuardOutcome<T>) -> Self {
        let message = match outcome {
            GuardOutcome::Ran(_) => SUCCESS_MESSAGE.to_string(),
            GuardOutcome::Skipped(reason) => format!("Skipped: {}", reason),
        };
        Self {
            status: "success",
            message,
        }
    }
}

pub async fn run_etl(State(state): State<AppState>) -> Result<Json<Envelope>, AppError> {
    let span = tracing::info_span!("run", run_id = %Uuid::new_v4(), action = "run-etl");
    let outcome = state.runner.batch_update().instrument(span).await?;
    Ok(Json(Envelope::from_outcome(&outcome)))
}

pub async fn clear_sheet(State(state): State<AppState>) -> Result<Json<Envelope>, AppError> {
    let span = tracing::info_span!("run", run_id = %Uuid::new_v4(), action = "clear-sheet");
    let outcome = state.runner.clear_all().instrument(span).await?;
    Ok(Json(Envelope::from_outcome(&outcome)))
}
