use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Default absolute USD move that triggers an alert
pub const DEFAULT_PRICE_DELTA_USD: f64 = 500.0;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// How the alert chart is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    /// Monospace bar chart appended to the message text
    Text,
    /// PNG line chart uploaded as a photo
    Image,
}

/// Immutable runtime configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub price_delta_usd: f64,
    /// Binance symbol, e.g. `BTCUSDT`
    pub symbol: String,
    pub coingecko_id: String,
    pub kline_interval: String,
    pub kline_limit: u32,
    /// `None` disables the scheduled trigger
    pub poll_interval: Option<Duration>,
    pub dry_run: bool,
    pub state_file: String,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub http_timeout: Duration,
    pub chart_style: ChartStyle,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let price_delta_usd = parse_threshold(get("PRICE_DELTA_USD"));

        let symbol = get("SYMBOL")
            .unwrap_or_else(|| "BTCUSDT".to_string())
            .to_uppercase();

        let poll_secs: u64 = parse_or("POLL_INTERVAL_SECS", get("POLL_INTERVAL_SECS"), 30)?;
        let timeout_secs: u64 = parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let kline_limit: u32 = parse_or("KLINE_LIMIT", get("KLINE_LIMIT"), 24)?;
        let bind_addr: SocketAddr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8080)),
        )?;

        let chart_style = match get("CHART_STYLE").map(|s| s.to_lowercase()).as_deref() {
            None | Some("text") => ChartStyle::Text,
            Some("image") => ChartStyle::Image,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "CHART_STYLE",
                    value: other.to_string(),
                    reason: "expected 'text' or 'image'".to_string(),
                })
            }
        };

        Ok(Self {
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_chat_id: get("TELEGRAM_CHAT_ID").unwrap_or_default(),
            price_delta_usd,
            symbol,
            coingecko_id: get("COINGECKO_ID")
                .unwrap_or_else(|| "bitcoin".to_string())
                .to_lowercase(),
            kline_interval: get("KLINE_INTERVAL").unwrap_or_else(|| "1h".to_string()),
            kline_limit,
            poll_interval: (poll_secs > 0).then(|| Duration::from_secs(poll_secs)),
            dry_run: matches!(
                get("DRY_RUN").map(|s| s.to_lowercase()).as_deref(),
                Some("1") | Some("true") | Some("yes")
            ),
            state_file: get("STATE_FILE").unwrap_or_else(|| "state.json".to_string()),
            database_url: get("DATABASE_URL"),
            bind_addr,
            http_timeout: Duration::from_secs(timeout_secs),
            chart_style,
        })
    }

    /// Base asset of the configured symbol (`BTCUSDT` -> `BTC`)
    pub fn base_asset(&self) -> &str {
        for quote in ["USDT", "USDC", "BUSD", "USD"] {
            if let Some(asset) = self.symbol.strip_suffix(quote) {
                if !asset.is_empty() {
                    return asset;
                }
            }
        }
        &self.symbol
    }

    pub fn has_telegram_credentials(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }
}

/// An unusable threshold falls back to the default instead of aborting
fn parse_threshold(raw: Option<String>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_PRICE_DELTA_USD;
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => {
            warn!(
                "PRICE_DELTA_USD '{}' is not a positive number, using {}",
                raw, DEFAULT_PRICE_DELTA_USD
            );
            DEFAULT_PRICE_DELTA_USD
        }
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
