pub mod error;
pub mod price;
pub mod telegram;

pub use error::ApiError;

use std::time::Duration;

/// User agent sent with every outbound request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client with a bounded request timeout
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))
}
