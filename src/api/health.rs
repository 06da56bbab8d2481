use crate::api::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready only when both collaborators were configured at startup.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let source = state.runner.source_available();
    let store = state.runner.store_available();

    if source && store {
        (StatusCode::OK, Json(serde_json::json!({"status": "ready"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "degraded",
                "store": store,
                "source": source,
            })),
        )
    }
}
