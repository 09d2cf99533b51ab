use axum::extract::State;
use axum::Json;

use super::AppState;
use crate::models::StatusReport;

/// `GET /status`: baseline and recent alerts
pub async fn execute(State(service): State<AppState>) -> Json<StatusReport> {
    Json(service.status().await)
}
