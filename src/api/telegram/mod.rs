//! Telegram Bot API notifier

pub mod client;
pub mod models;

pub use client::TelegramClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::PricePoint;
use crate::services::chart_service;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set")]
    MissingCredentials,

    #[error("Telegram API error: {0}")]
    Api(#[from] ApiError),

    #[error("Telegram rejected the request: {0}")]
    Rejected(String),
}

/// Outbound alert channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an HTML-formatted text message
    async fn send(&self, text: &str) -> Result<(), TelegramError>;

    /// Upload a PNG image with an HTML caption
    async fn send_photo(&self, png: Vec<u8>, caption: &str) -> Result<(), TelegramError>;

    /// Send `caption` followed by a monospace bar chart of `history`
    async fn send_with_history(&self, history: &[PricePoint], caption: &str) -> Result<(), TelegramError> {
        let message = format!(
            "{}\n\n<pre>{}</pre>",
            caption,
            chart_service::render_text_chart(history)
        );
        self.send(&message).await
    }
}
