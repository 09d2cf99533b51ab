//! Price feed: ordered spot-price providers plus the klines history endpoint

pub mod client;
pub mod models;

pub use client::{HttpPriceProvider, KlinesClient, PriceEndpoint};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::config::Config;
use crate::models::PricePoint;

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("All price providers failed: {}", .0.join("; "))]
    AllProvidersFailed(Vec<String>),

    #[error("Price history unavailable: {0}")]
    History(#[from] ApiError),
}

/// A single spot-price endpoint
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_price(&self) -> Result<f64, ApiError>;
}

/// What the alert check needs from the market
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Spot price from the first provider that answers
    async fn current_price(&self) -> Result<f64, PriceError>;

    /// Recent candles, oldest first. No fallback.
    async fn history(&self, interval: &str, limit: u32) -> Result<Vec<PricePoint>, PriceError>;
}

/// Providers tried in priority order, one pass per call
pub struct PriceSource {
    providers: Vec<Box<dyn PriceProvider>>,
    klines: KlinesClient,
}

impl PriceSource {
    pub fn new(providers: Vec<Box<dyn PriceProvider>>, klines: KlinesClient) -> Self {
        Self { providers, klines }
    }

    /// Coinbase, then CoinGecko, then Binance
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let providers: Vec<Box<dyn PriceProvider>> = [
            PriceEndpoint::Coinbase,
            PriceEndpoint::CoinGecko,
            PriceEndpoint::Binance,
        ]
        .into_iter()
        .map(|endpoint| {
            Box::new(HttpPriceProvider::for_config(endpoint, config, http.clone()))
                as Box<dyn PriceProvider>
        })
        .collect();

        let klines = KlinesClient::new(http, config.symbol.clone());
        Self::new(providers, klines)
    }
}

#[async_trait]
impl PriceFeed for PriceSource {
    async fn current_price(&self) -> Result<f64, PriceError> {
        let mut failures = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.fetch_price().await {
                Ok(price) => {
                    debug!("Price {} from {}", price, provider.name());
                    return Ok(price);
                }
                Err(e) => {
                    warn!("Price provider {} failed: {}. Trying next...", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(PriceError::AllProvidersFailed(failures))
    }

    async fn history(&self, interval: &str, limit: u32) -> Result<Vec<PricePoint>, PriceError> {
        Ok(self.klines.get_klines(interval, limit).await?)
    }
}
