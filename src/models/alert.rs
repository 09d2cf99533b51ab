//! Persisted alert state

use serde::{Deserialize, Serialize};

/// Number of alerts kept in the rolling history
pub const MAX_ALERT_HISTORY: usize = 10;

/// Direction of a price move relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` for a strictly positive change, `Down` otherwise
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fired alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Unix time in milliseconds
    pub timestamp: i64,
    pub price: f64,
    pub change: f64,
    pub direction: Direction,
}

/// The single record kept by the state store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    #[serde(default)]
    pub last_alert_price: Option<f64>,
    #[serde(default)]
    pub alert_history: Vec<AlertRecord>,
}

impl AlertState {
    /// Current baseline, if one has been recorded.
    ///
    /// A stored value that is zero, negative or not finite counts as missing
    /// so a corrupted record re-initializes instead of alerting on every check.
    pub fn baseline(&self) -> Option<f64> {
        self.last_alert_price
            .filter(|price| price.is_finite() && *price > 0.0)
    }

    /// Append an alert and drop the oldest entries beyond [`MAX_ALERT_HISTORY`]
    pub fn push_alert(&mut self, record: AlertRecord) {
        self.alert_history.push(record);
        if self.alert_history.len() > MAX_ALERT_HISTORY {
            let excess = self.alert_history.len() - MAX_ALERT_HISTORY;
            self.alert_history.drain(..excess);
        }
    }

    /// The newest `count` alerts, oldest first
    pub fn recent_alerts(&self, count: usize) -> &[AlertRecord] {
        let start = self.alert_history.len().saturating_sub(count);
        &self.alert_history[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: i64) -> AlertRecord {
        AlertRecord {
            timestamp: i,
            price: 60_000.0 + i as f64,
            change: 500.0,
            direction: Direction::Up,
        }
    }

    #[test]
    fn test_history_keeps_last_ten_in_order() {
        let mut state = AlertState::default();
        for i in 0..25 {
            state.push_alert(record(i));
            assert!(state.alert_history.len() <= MAX_ALERT_HISTORY);
        }

        let timestamps: Vec<i64> = state.alert_history.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, (15..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_history_below_limit_is_untouched() {
        let mut state = AlertState::default();
        for i in 0..3 {
            state.push_alert(record(i));
        }
        assert_eq!(state.alert_history.len(), 3);
        assert_eq!(state.alert_history[0].timestamp, 0);
    }

    #[test]
    fn test_recent_alerts() {
        let mut state = AlertState::default();
        for i in 0..8 {
            state.push_alert(record(i));
        }
        let recent: Vec<i64> = state.recent_alerts(5).iter().map(|r| r.timestamp).collect();
        assert_eq!(recent, vec![3, 4, 5, 6, 7]);
        assert_eq!(AlertState::default().recent_alerts(5).len(), 0);
    }

    #[test]
    fn test_baseline_ignores_invalid_values() {
        let mut state = AlertState::default();
        assert_eq!(state.baseline(), None);
        state.last_alert_price = Some(0.0);
        assert_eq!(state.baseline(), None);
        state.last_alert_price = Some(f64::NAN);
        assert_eq!(state.baseline(), None);
        state.last_alert_price = Some(60_000.0);
        assert_eq!(state.baseline(), Some(60_000.0));
    }

    #[test]
    fn test_state_json_shape() {
        let mut state = AlertState {
            last_alert_price: Some(60_600.0),
            alert_history: Vec::new(),
        };
        state.push_alert(AlertRecord {
            timestamp: 1_700_000_000_000,
            price: 60_600.0,
            change: 600.0,
            direction: Direction::Up,
        });

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["last_alert_price"], 60_600.0);
        assert_eq!(json["alert_history"][0]["direction"], "up");
        assert_eq!(json["alert_history"][0]["change"], 600.0);

        // Records written before any alert fired only carry a null baseline
        let partial: AlertState = serde_json::from_str(r#"{"last_alert_price":null}"#).unwrap();
        assert_eq!(partial, AlertState::default());
    }
}
