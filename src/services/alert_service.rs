use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::price::{PriceError, PriceFeed};
use crate::api::telegram::{Notifier, TelegramError};
use crate::config::{ChartStyle, Config};
use crate::db::StateStore;
use crate::models::{AlertRecord, CheckResult, Direction, PricePoint, StatusReport};
use crate::services::chart_service;
use crate::utils::{format_signed_usd, format_usd};

const PNG_CHART_SIZE: (u32, u32) = (1200, 500);

#[derive(Error, Debug)]
pub enum AlertError {
    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Notify(#[from] TelegramError),
}

/// What a single check should do, given the stored baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// No baseline yet: record the current price
    InitializeBaseline,
    /// Move is below the threshold
    Hold { baseline: f64, change: f64 },
    /// Move reached the threshold
    Alert {
        baseline: f64,
        change: f64,
        direction: Direction,
    },
}

/// Compare the current price against the baseline.
///
/// A move of exactly `threshold` alerts.
pub fn evaluate(baseline: Option<f64>, current: f64, threshold: f64) -> Decision {
    let Some(baseline) = baseline else {
        return Decision::InitializeBaseline;
    };

    let change = current - baseline;
    if change.abs() >= threshold {
        Decision::Alert {
            baseline,
            change,
            direction: Direction::from_change(change),
        }
    } else {
        Decision::Hold { baseline, change }
    }
}

/// HTML caption sent with every alert
pub fn build_caption(
    config: &Config,
    current: f64,
    baseline: f64,
    change: f64,
    direction: Direction,
    at: DateTime<Utc>,
) -> String {
    let change_percent = change.abs() / baseline * 100.0;
    let (emoji, arrow, verb) = match direction {
        Direction::Up => ("🚀📈", "⬆️", "INCREASED"),
        Direction::Down => ("📉💥", "⬇️", "DECREASED"),
    };
    let asset = config.base_asset();

    format!(
        "{emoji} <b>{asset} PRICE ALERT</b> {emoji}\n\
         \n\
         💰 <b>Current Price:</b> {current}\n\
         📊 <b>Previous Alert:</b> {baseline}\n\
         {arrow} <b>Change:</b> {change} ({change_percent:.2}%)\n\
         \n\
         🔔 {asset} has <b>{verb}</b> by more than {threshold} since the last alert!\n\
         \n\
         ⏰ <b>Time:</b> {time} UTC\n\
         📈 <b>Symbol:</b> {symbol}",
        emoji = emoji,
        asset = asset,
        current = format_usd(current),
        baseline = format_usd(baseline),
        arrow = arrow,
        change = format_usd(change.abs()),
        change_percent = change_percent,
        verb = verb,
        threshold = format_usd(config.price_delta_usd),
        time = at.format("%Y-%m-%d %H:%M:%S"),
        symbol = config.symbol,
    )
}

/// Runs price checks against the stored baseline
pub struct AlertService {
    config: Config,
    prices: Box<dyn PriceFeed>,
    store: Box<dyn StateStore>,
    notifier: Box<dyn Notifier>,
}

impl AlertService {
    pub fn new(
        config: Config,
        prices: Box<dyn PriceFeed>,
        store: Box<dyn StateStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            prices,
            store,
            notifier,
        }
    }

    /// Run one check. Errors are logged and reported in the result, never raised.
    pub async fn check(&self) -> CheckResult {
        match self.run_check().await {
            Ok(result) => result,
            Err(e) => {
                error!("Price check failed: {}", e);
                CheckResult::failure(e.to_string())
            }
        }
    }

    /// Current baseline and the newest alerts
    pub async fn status(&self) -> StatusReport {
        StatusReport::from(&self.store.read().await)
    }

    async fn run_check(&self) -> Result<CheckResult, AlertError> {
        let mut state = self.store.read().await;

        let current = self.prices.current_price().await?;
        info!("Current {} price: {}", self.config.symbol, format_usd(current));

        match evaluate(state.baseline(), current, self.config.price_delta_usd) {
            Decision::InitializeBaseline => {
                state.last_alert_price = Some(current);
                self.store.write(&state).await;
                info!("Baseline price set to: {}", format_usd(current));
                Ok(CheckResult::baseline_initialized(current))
            }
            Decision::Hold { baseline, change } => {
                info!(
                    "Price change: {} vs {} (threshold: {})",
                    format_signed_usd(change),
                    format_usd(baseline),
                    format_usd(self.config.price_delta_usd)
                );
                Ok(CheckResult::no_alert(current, change))
            }
            Decision::Alert {
                baseline,
                change,
                direction,
            } => {
                info!(
                    "Alert triggered! Price moved {} by {}",
                    direction,
                    format_usd(change.abs())
                );

                let history = self
                    .prices
                    .history(&self.config.kline_interval, self.config.kline_limit)
                    .await?;

                let now = Utc::now();
                let caption = build_caption(&self.config, current, baseline, change, direction, now);

                if self.config.dry_run {
                    info!(
                        "DRY RUN - Would send alert:\n{}\n{}",
                        caption,
                        chart_service::render_text_chart(&history)
                    );
                } else {
                    self.deliver(&history, &caption, baseline, current, direction).await?;
                    info!("Alert sent successfully");
                }
                let result = CheckResult::alert_sent(current, change, direction);

                state.last_alert_price = Some(current);
                state.push_alert(AlertRecord {
                    timestamp: now.timestamp_millis(),
                    price: current,
                    change,
                    direction,
                });
                self.store.write(&state).await;

                Ok(result)
            }
        }
    }

    async fn deliver(
        &self,
        history: &[PricePoint],
        caption: &str,
        baseline: f64,
        current: f64,
        direction: Direction,
    ) -> Result<(), TelegramError> {
        if self.config.chart_style == ChartStyle::Image {
            let (width, height) = PNG_CHART_SIZE;
            match chart_service::render_png_chart(
                history,
                &self.config.symbol,
                baseline,
                current,
                direction,
                width,
                height,
            ) {
                Ok(png) => return self.notifier.send_photo(png, caption).await,
                Err(e) => warn!("Chart image unavailable ({}), sending text chart", e),
            }
        }

        self.notifier.send_with_history(history, caption).await
    }
}
