//! Chart generation models

use chrono::{DateTime, Utc};

/// A single candle close used for chart rendering
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}
