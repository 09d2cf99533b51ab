pub mod alert_service;
pub mod chart_service;
pub mod scheduler;

pub use alert_service::AlertService;
