//! Health check handler

use axum::{extract::State, http::StatusCode, response::Json};

use crate::app::AppState;
use crate::core::response::HealthResponse;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.user_service.health().await {
        (StatusCode::OK, Json(HealthResponse::up()))
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(HealthResponse::down()))
    }
}
