//! Data models for the alert bot
//!
//! Persisted state, chart inputs and the JSON payloads returned by the
//! trigger endpoints.

pub mod alert;
pub mod chart;
pub mod check;

pub use alert::{AlertRecord, AlertState, Direction};
pub use chart::PricePoint;
pub use check::{CheckResult, StatusReport};
