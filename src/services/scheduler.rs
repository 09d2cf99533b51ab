use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::AlertService;

/// Run a check every `period` until the task is dropped.
///
/// A check that overruns the period delays the next one instead of
/// queueing a burst of catch-up checks.
pub async fn run(service: Arc<AlertService>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("⏱️ Scheduled checks every {}s", period.as_secs());

    loop {
        ticker.tick().await;
        info!("Scheduled check triggered");

        let result = service.check().await;
        if result.success {
            info!(
                "Scheduled check result: {} (price: {:?}, change: {:?})",
                result.message.as_deref().unwrap_or_default(),
                result.price,
                result.change
            );
        } else {
            warn!(
                "Scheduled check failed: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
