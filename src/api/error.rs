use tracing::warn;

/// Error type shared by the outbound API clients
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 400 Bad Request
    BadRequest(String),
    /// 401 Unauthorized
    Unauthorized(String),
    /// 403 Forbidden
    Forbidden(String),
    /// 404 Not Found
    NotFound(String),
    /// 429 Too Many Requests
    RateLimited { retry_after: Option<i64> },
    /// 5xx Server Error
    ServerError(u16, String),
    /// Other HTTP errors
    HttpError(u16, String),
    /// Network/request error
    RequestError(String),
    /// Deserialization error
    DeserializationError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::RateLimited { retry_after } => match retry_after {
                Some(secs) => write!(f, "Rate Limited. Retry after {} s", secs),
                None => write!(f, "Rate Limited"),
            },
            ApiError::ServerError(code, msg) => write!(f, "Server Error ({}): {}", code, msg),
            ApiError::HttpError(code, msg) => write!(f, "HTTP Error ({}): {}", code, msg),
            ApiError::RequestError(msg) => write!(f, "Request Error: {}", msg),
            ApiError::DeserializationError(msg) => write!(f, "Deserialization Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Classify a non-success response by status code
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body_text = response.text().await.unwrap_or_default();
        Self::from_status(status.as_u16(), body_text, retry_after)
    }

    pub fn from_status(status_code: u16, body_text: String, retry_after: Option<i64>) -> Self {
        match status_code {
            400 => {
                // Telegram and most exchanges put the reason in `description` or `msg`
                let message = serde_json::from_str::<serde_json::Value>(&body_text)
                    .ok()
                    .and_then(|json| {
                        ["description", "message", "msg"]
                            .iter()
                            .find_map(|key| json.get(*key).and_then(|v| v.as_str()).map(str::to_string))
                    })
                    .unwrap_or(body_text);
                ApiError::BadRequest(message)
            }
            401 => ApiError::Unauthorized(body_text),
            403 => ApiError::Forbidden(body_text),
            404 => ApiError::NotFound(body_text),
            429 => {
                warn!("Rate limited, retry after {:?} s", retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::DeserializationError(e.to_string())
        } else {
            ApiError::RequestError(format!("Request failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(404, "gone".to_string(), None),
            ApiError::NotFound("gone".to_string())
        );
        assert_eq!(
            ApiError::from_status(503, "down".to_string(), None),
            ApiError::ServerError(503, "down".to_string())
        );
        assert_eq!(
            ApiError::from_status(429, String::new(), Some(3)),
            ApiError::RateLimited { retry_after: Some(3) }
        );
        assert_eq!(
            ApiError::from_status(418, "teapot".to_string(), None),
            ApiError::HttpError(418, "teapot".to_string())
        );
    }

    #[test]
    fn test_bad_request_extracts_description() {
        let body = r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;
        assert_eq!(
            ApiError::from_status(400, body.to_string(), None),
            ApiError::BadRequest("Bad Request: chat not found".to_string())
        );
        assert_eq!(
            ApiError::from_status(400, "plain".to_string(), None),
            ApiError::BadRequest("plain".to_string())
        );
    }
}
