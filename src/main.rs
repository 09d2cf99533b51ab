use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod db;
mod models;
mod services;
mod utils;

use api::price::PriceSource;
use api::telegram::TelegramClient;
use config::Config;
use services::{scheduler, AlertService};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "btc_price_alert=debug"
                        .parse()
                        .expect("static directive is valid"),
                )
                .add_directive("sqlx=warn".parse().expect("static directive is valid")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let http = match api::build_http_client(config.http_timeout) {
        Ok(http) => http,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    if std::env::args().nth(1).as_deref() == Some("chat-id") {
        if let Err(e) = commands::chat_id::execute(&config, http).await {
            error!("{}", e);
        }
        return;
    }

    info!("🤖 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!(
        "   Watching {} for moves of {} or more",
        config.symbol,
        utils::format_usd(config.price_delta_usd)
    );
    if config.dry_run {
        info!("   DRY RUN enabled: alerts are logged, not sent");
    } else if !config.has_telegram_credentials() {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID missing. Alerts will fail until both are set or DRY_RUN=1.");
    }

    let store = match db::init_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize state store: {}", e);
            return;
        }
    };

    let prices = PriceSource::from_config(&config, http.clone());
    let notifier = TelegramClient::new(
        http,
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    );

    let bind_addr = config.bind_addr;
    let poll_interval = config.poll_interval;
    let service = Arc::new(AlertService::new(
        config,
        Box::new(prices),
        store,
        Box::new(notifier),
    ));

    match poll_interval {
        Some(period) => {
            tokio::spawn(scheduler::run(service.clone(), period));
        }
        None => info!("POLL_INTERVAL_SECS=0, scheduled checks disabled"),
    }

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            return;
        }
    };
    info!("HTTP triggers listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, commands::router(service)).await {
        error!("Server error: {}", e);
    }
}
