pub mod health;
pub mod trigger;

use crate::orchestration::ReportRunner;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<ReportRunner>,
}

impl AppState {
    pub fn new(runner: ReportRunner) -> Self {
        Self {
            runner: Arc::new(runner),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/run-etl", post(trigger::run_etl))
        .route("/clear-sheet", post(trigger::clear_sheet))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
