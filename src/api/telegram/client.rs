use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{SendMessageRequest, TelegramResponse, Update};
use super::{Notifier, TelegramError};
use crate::api::ApiError;

/// Telegram Bot API client bound to one bot and one chat
pub struct TelegramClient {
    http_client: HttpClient,
    bot_token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.telegram.org";

    pub fn new(http_client: HttpClient, bot_token: String, chat_id: String) -> Self {
        Self::with_base_url(http_client, bot_token, chat_id, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(
        http_client: HttpClient,
        bot_token: String,
        chat_id: String,
        base_url: String,
    ) -> Self {
        Self {
            http_client,
            bot_token,
            chat_id,
            base_url,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    fn ensure_credentials(&self, need_chat: bool) -> Result<(), TelegramError> {
        if self.bot_token.is_empty() || (need_chat && self.chat_id.is_empty()) {
            return Err(TelegramError::MissingCredentials);
        }
        Ok(())
    }

    /// Unwrap the `{ok, result, description}` envelope
    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, TelegramError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await.into());
        }

        let envelope: TelegramResponse<T> = response.json().await.map_err(ApiError::from)?;
        if !envelope.ok {
            return Err(TelegramError::Rejected(
                envelope.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(envelope.result)
    }

    /// POST /bot{token}/sendMessage
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        self.ensure_credentials(true)?;

        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        let response = self.http_client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::read_response::<serde_json::Value>(response).await?;
        debug!("Telegram message delivered to chat {}", self.chat_id);
        Ok(())
    }

    /// POST /bot{token}/sendPhoto as multipart form
    pub async fn send_photo_bytes(&self, png: Vec<u8>, caption: &str) -> Result<(), TelegramError> {
        self.ensure_credentials(true)?;

        let photo = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")
            .map_err(ApiError::from)?;
        let form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("photo", photo);

        let response = self.http_client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::read_response::<serde_json::Value>(response).await?;
        debug!("Telegram photo delivered to chat {}", self.chat_id);
        Ok(())
    }

    /// GET /bot{token}/getUpdates
    ///
    /// Only needs the bot token; used to discover the chat id.
    pub async fn get_updates(&self) -> Result<Vec<Update>, TelegramError> {
        self.ensure_credentials(false)?;

        let response = self.http_client
            .get(self.method_url("getUpdates"))
            .send()
            .await
            .map_err(ApiError::from)?;

        Ok(Self::read_response(response).await?.unwrap_or_default())
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, text: &str) -> Result<(), TelegramError> {
        self.send_message(text).await
    }

    async fn send_photo(&self, png: Vec<u8>, caption: &str) -> Result<(), TelegramError> {
        self.send_photo_bytes(png, caption).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn spawn_fake_telegram(received: Arc<Mutex<Vec<Value>>>) -> String {
        let app = Router::new()
            .route(
                "/botgood/sendMessage",
                post(move |Json(body): Json<Value>| {
                    let received = received.clone();
                    async move {
                        received.lock().unwrap().push(body);
                        Json(json!({"ok": true, "result": {"message_id": 1}}))
                    }
                }),
            )
            .route(
                "/botbad/sendMessage",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"})),
                    )
                }),
            )
            .route(
                "/botany/getUpdates",
                get(|| async {
                    Json(json!({"ok": true, "result": [
                        {"update_id": 7, "message": {"chat": {"id": 4242}, "from": {"username": "alice"}, "text": "hi"}}
                    ]}))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_send_message_posts_html_payload() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let base_url = spawn_fake_telegram(received.clone()).await;
        let client = TelegramClient::with_base_url(
            HttpClient::new(),
            "good".to_string(),
            "4242".to_string(),
            base_url,
        );

        client.send("<b>hello</b>").await.unwrap();

        let bodies = received.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["chat_id"], "4242");
        assert_eq!(bodies[0]["text"], "<b>hello</b>");
        assert_eq!(bodies[0]["parse_mode"], "HTML");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base_url = spawn_fake_telegram(Arc::new(Mutex::new(Vec::new()))).await;
        let client = TelegramClient::with_base_url(
            HttpClient::new(),
            "bad".to_string(),
            "4242".to_string(),
            base_url,
        );

        match client.send("hello").await {
            Err(TelegramError::Api(ApiError::BadRequest(msg))) => assert!(msg.contains("chat not found")),
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let client = TelegramClient::new(HttpClient::new(), String::new(), "1".to_string());
        assert!(matches!(client.send("x").await, Err(TelegramError::MissingCredentials)));

        let client = TelegramClient::new(HttpClient::new(), "token".to_string(), String::new());
        assert!(matches!(
            client.send_photo(vec![1, 2, 3], "x").await,
            Err(TelegramError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn test_get_updates() {
        let base_url = spawn_fake_telegram(Arc::new(Mutex::new(Vec::new()))).await;
        let client = TelegramClient::with_base_url(HttpClient::new(), "any".to_string(), String::new(), base_url);

        let updates = client.get_updates().await.unwrap();
        assert_eq!(updates.len(), 1);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 4242);
        assert_eq!(message.from.as_ref().unwrap().username.as_deref(), Some("alice"));
    }
}
