//! Trigger endpoint payloads

use serde::Serialize;

use super::{AlertRecord, AlertState, Direction};

/// Outcome of one price check as reported by `/check`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn baseline_initialized(price: f64) -> Self {
        Self::ok("Baseline initialized", price, None, None)
    }

    pub fn no_alert(price: f64, change: f64) -> Self {
        Self::ok("No alert needed", price, Some(change), None)
    }

    pub fn alert_sent(price: f64, change: f64, direction: Direction) -> Self {
        Self::ok("Alert sent", price, Some(change), Some(direction))
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            price: None,
            change: None,
            direction: None,
            error: Some(error.into()),
        }
    }

    fn ok(message: &str, price: f64, change: Option<f64>, direction: Option<Direction>) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            price: Some(price),
            change,
            direction,
            error: None,
        }
    }
}

/// Number of alerts exposed by `/status`
pub const STATUS_HISTORY_LEN: usize = 5;

/// Snapshot returned by `/status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub last_alert_price: Option<f64>,
    pub alert_history: Vec<AlertRecord>,
}

impl From<&AlertState> for StatusReport {
    fn from(state: &AlertState) -> Self {
        Self {
            status: "running",
            last_alert_price: state.last_alert_price,
            alert_history: state.recent_alerts(STATUS_HISTORY_LEN).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_shape() {
        let json = serde_json::to_value(CheckResult::failure("All price providers failed")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "All price providers failed"}));
    }

    #[test]
    fn test_alert_shape() {
        let json = serde_json::to_value(CheckResult::alert_sent(60_600.0, 600.0, Direction::Up)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Alert sent");
        assert_eq!(json["direction"], "up");
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(CheckResult::baseline_initialized(60_000.0)).unwrap();
        assert!(json.get("change").is_none());
        assert!(json.get("direction").is_none());
    }
}
