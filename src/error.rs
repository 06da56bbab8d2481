use crate::orchestration::RunError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Store error: {0}")]
    Store(String),
}

impl From<RunError> for AppError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Upstream(e) => AppError::Upstream(e.to_string()),
            RunError::Store(e) => AppError::Store(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
