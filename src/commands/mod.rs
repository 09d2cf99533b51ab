//! Trigger surface: HTTP routes plus the `chat-id` helper command
//!
//! | Method       | Path      | Description                          |
//! |--------------|-----------|--------------------------------------|
//! | `GET`/`POST` | `/check`  | Run one price check now              |
//! | `GET`        | `/status` | Baseline and the last 5 alerts       |
//! | any          | other     | Plain-text banner                    |

pub mod chat_id;
pub mod check;
pub mod status;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::services::AlertService;

/// Shared state for every handler
pub type AppState = Arc<AlertService>;

pub const BANNER: &str = "Bitcoin Price Alert Bot - Use /status or /check endpoints";

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/check", get(check::execute).post(check::execute))
        .route("/status", get(status::execute))
        .fallback(banner)
        .with_state(service)
}

async fn banner() -> &'static str {
    BANNER
}
