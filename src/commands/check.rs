use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::models::CheckResult;

/// `GET|POST /check`: run one price check now
pub async fn execute(State(service): State<AppState>) -> Json<CheckResult> {
    info!("🔎 Manual check requested");
    Json(service.check().await)
}
