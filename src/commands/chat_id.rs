use tracing::info;

use crate::api::telegram::models::Update;
use crate::api::telegram::TelegramClient;
use crate::config::Config;
use crate::utils::Table;

/// Messages listed by the `chat-id` command
const RECENT_UPDATES: usize = 5;

/// `btc-price-alert chat-id`: list the chats that recently messaged the bot
pub async fn execute(config: &Config, http: reqwest::Client) -> Result<(), String> {
    if config.telegram_bot_token.is_empty() {
        return Err("TELEGRAM_BOT_TOKEN is not set. Export it and run this command again.".to_string());
    }

    info!("Fetching recent updates for the bot...");
    let client = TelegramClient::new(http, config.telegram_bot_token.clone(), String::new());
    let updates = client
        .get_updates()
        .await
        .map_err(|e| format!("Failed to fetch updates: {}", e))?;

    match render_updates(&updates) {
        Some((table, latest)) => {
            println!("Recent messages:\n{}", table);
            println!("Your chat ID is: {}", latest);
            Ok(())
        }
        None => Err(
            "No messages found. Send any message to your bot in Telegram, then run this command again."
                .to_string(),
        ),
    }
}

/// Table of the newest updates and the chat id of the latest message
fn render_updates(updates: &[Update]) -> Option<(String, i64)> {
    let messages: Vec<_> = updates.iter().filter_map(|u| u.message.as_ref()).collect();
    let latest = messages.last()?.chat.id;

    let mut table = Table::new(&["Chat ID", "From", "Message"]);
    let start = messages.len().saturating_sub(RECENT_UPDATES);
    for msg in &messages[start..] {
        let from = msg
            .from
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .map(|name| format!("@{}", name))
            .unwrap_or_else(|| "Unknown".to_string());
        table.add_row(vec![
            msg.chat.id.to_string(),
            from,
            msg.text.clone().unwrap_or_else(|| "No text".to_string()),
        ]);
    }

    Some((table.render(), latest))
}
