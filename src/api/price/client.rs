use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client as HttpClient;

use super::models::{BinanceKline, BinanceTickerPrice, CoinGeckoSimplePrice, CoinbaseRatesResponse};
use super::PriceProvider;
use crate::api::ApiError;
use crate::config::Config;
use crate::models::PricePoint;

const COINBASE_BASE_URL: &str = "https://api.coinbase.com";
const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";
const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Known spot-price endpoints, each with its own response shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceEndpoint {
    Coinbase,
    CoinGecko,
    Binance,
}

impl PriceEndpoint {
    pub fn name(&self) -> &'static str {
        match self {
            PriceEndpoint::Coinbase => "coinbase",
            PriceEndpoint::CoinGecko => "coingecko",
            PriceEndpoint::Binance => "binance",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            PriceEndpoint::Coinbase => COINBASE_BASE_URL,
            PriceEndpoint::CoinGecko => COINGECKO_BASE_URL,
            PriceEndpoint::Binance => BINANCE_BASE_URL,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            PriceEndpoint::Coinbase => "/v2/exchange-rates",
            PriceEndpoint::CoinGecko => "/api/v3/simple/price",
            PriceEndpoint::Binance => "/api/v3/ticker/price",
        }
    }

    fn query(&self, config: &Config) -> Vec<(&'static str, String)> {
        match self {
            PriceEndpoint::Coinbase => vec![("currency", config.base_asset().to_string())],
            PriceEndpoint::CoinGecko => vec![
                ("ids", config.coingecko_id.clone()),
                ("vs_currencies", "usd".to_string()),
            ],
            PriceEndpoint::Binance => vec![("symbol", config.symbol.clone())],
        }
    }

    /// Extract the USD price from a response body
    pub fn parse_price(&self, body: &str, coingecko_id: &str) -> Result<f64, ApiError> {
        let raw = match self {
            PriceEndpoint::Coinbase => {
                let resp: CoinbaseRatesResponse = parse_json(body)?;
                resp.data
                    .rates
                    .get("USD")
                    .ok_or_else(|| missing("data.rates.USD"))?
                    .parse::<f64>()
                    .map_err(|e| ApiError::DeserializationError(format!("Bad USD rate: {}", e)))?
            }
            PriceEndpoint::CoinGecko => {
                let resp: CoinGeckoSimplePrice = parse_json(body)?;
                *resp
                    .get(coingecko_id)
                    .and_then(|prices| prices.get("usd"))
                    .ok_or_else(|| missing(&format!("{}.usd", coingecko_id)))?
            }
            PriceEndpoint::Binance => {
                let resp: BinanceTickerPrice = parse_json(body)?;
                resp.price
                    .parse::<f64>()
                    .map_err(|e| ApiError::DeserializationError(format!("Bad price: {}", e)))?
            }
        };

        if raw.is_finite() && raw > 0.0 {
            Ok(raw)
        } else {
            Err(ApiError::DeserializationError(format!("Implausible price {}", raw)))
        }
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
}

fn missing(field: &str) -> ApiError {
    ApiError::DeserializationError(format!("Missing field {}", field))
}

/// Spot-price provider backed by one HTTP endpoint
pub struct HttpPriceProvider {
    http_client: HttpClient,
    endpoint: PriceEndpoint,
    base_url: String,
    query: Vec<(&'static str, String)>,
    coingecko_id: String,
}

impl HttpPriceProvider {
    pub fn for_config(endpoint: PriceEndpoint, config: &Config, http_client: HttpClient) -> Self {
        Self::with_base_url(endpoint, config, http_client, endpoint.default_base_url().to_string())
    }

    /// Create a provider with a custom base URL (for testing)
    pub fn with_base_url(
        endpoint: PriceEndpoint,
        config: &Config,
        http_client: HttpClient,
        base_url: String,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            base_url,
            query: endpoint.query(config),
            coingecko_id: config.coingecko_id.clone(),
        }
    }
}

#[async_trait]
impl PriceProvider for HttpPriceProvider {
    fn name(&self) -> &str {
        self.endpoint.name()
    }

    async fn fetch_price(&self) -> Result<f64, ApiError> {
        let url = format!("{}{}", self.base_url, self.endpoint.path());

        let response = self.http_client
            .get(&url)
            .query(&self.query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let body = response.text().await?;
        self.endpoint.parse_price(&body, &self.coingecko_id)
    }
}

/// Binance klines endpoint, the only source of price history
pub struct KlinesClient {
    http_client: HttpClient,
    symbol: String,
    base_url: String,
}

impl KlinesClient {
    pub fn new(http_client: HttpClient, symbol: String) -> Self {
        Self::with_base_url(http_client, symbol, BINANCE_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(http_client: HttpClient, symbol: String, base_url: String) -> Self {
        Self {
            http_client,
            symbol,
            base_url,
        }
    }

    /// GET /api/v3/klines
    ///
    /// Returns `limit` candles of `interval` width, oldest first.
    pub async fn get_klines(&self, interval: &str, limit: u32) -> Result<Vec<PricePoint>, ApiError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();

        let response = self.http_client
            .get(&url)
            .query(&[
                ("symbol", self.symbol.as_str()),
                ("interval", interval),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let rows: Vec<BinanceKline> = response.json().await?;
        parse_klines(&rows)
    }
}

/// Keep open time and close of each kline row
pub fn parse_klines(rows: &[BinanceKline]) -> Result<Vec<PricePoint>, ApiError> {
    rows.iter()
        .map(|row| {
            let open_time = row
                .first()
                .and_then(|v| v.as_i64())
                .ok_or_else(|| missing("kline open time"))?;
            let close = row
                .get(4)
                .and_then(|v| match v {
                    serde_json::Value::String(s) => s.parse::<f64>().ok(),
                    other => other.as_f64(),
                })
                .ok_or_else(|| missing("kline close"))?;
            let timestamp = DateTime::from_timestamp_millis(open_time)
                .ok_or_else(|| ApiError::DeserializationError(format!("Bad kline time {}", open_time)))?;
            Ok(PricePoint { timestamp, close })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::price::{PriceFeed, PriceSource};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn test_parse_coinbase() {
        let body = r#"{"data":{"currency":"BTC","rates":{"EUR":"55000.1","USD":"60123.45"}}}"#;
        assert_eq!(PriceEndpoint::Coinbase.parse_price(body, "bitcoin").unwrap(), 60123.45);

        let body = r#"{"data":{"currency":"BTC","rates":{"EUR":"55000.1"}}}"#;
        assert!(PriceEndpoint::Coinbase.parse_price(body, "bitcoin").is_err());
    }

    #[test]
    fn test_parse_coingecko() {
        let body = r#"{"bitcoin":{"usd":60250}}"#;
        assert_eq!(PriceEndpoint::CoinGecko.parse_price(body, "bitcoin").unwrap(), 60250.0);
        assert!(PriceEndpoint::CoinGecko.parse_price(body, "ethereum").is_err());
    }

    #[test]
    fn test_parse_binance() {
        let body = r#"{"symbol":"BTCUSDT","price":"60300.00000000"}"#;
        assert_eq!(PriceEndpoint::Binance.parse_price(body, "bitcoin").unwrap(), 60300.0);
        assert!(PriceEndpoint::Binance.parse_price(r#"{"price":"n/a"}"#, "bitcoin").is_err());
        assert!(PriceEndpoint::Binance.parse_price(r#"{"price":"0"}"#, "bitcoin").is_err());
        assert!(PriceEndpoint::Binance.parse_price("<html>", "bitcoin").is_err());
    }

    #[test]
    fn test_parse_klines() {
        let rows: Vec<BinanceKline> = serde_json::from_value(json!([
            [1700000000000i64, "60000.0", "60500.0", "59900.0", "60400.5", "12.3", 1700003599999i64],
            [1700003600000i64, "60400.5", "60800.0", "60300.0", "60750.0", "8.1", 1700007199999i64]
        ]))
        .unwrap();
        let points = parse_klines(&rows).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 60400.5);
        assert_eq!(points[1].timestamp.timestamp_millis(), 1700003600000);

        let broken: Vec<BinanceKline> = serde_json::from_value(json!([[1700000000000i64, "1"]])).unwrap();
        assert!(parse_klines(&broken).is_err());
    }

    async fn spawn_fake_exchange() -> String {
        let app = Router::new()
            .route(
                "/v2/exchange-rates",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route(
                "/api/v3/simple/price",
                get(|| async { Json(json!({"bitcoin": {"usd": 61234.5}})) }),
            )
            .route(
                "/api/v3/ticker/price",
                get(|| async { Json(json!({"symbol": "BTCUSDT", "price": "1.0"})) }),
            )
            .route(
                "/api/v3/klines",
                get(|| async {
                    Json(json!([[1700000000000i64, "1", "1", "1", "61000.0", "1", 1700003599999i64]]))
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
    async fn test_http_fallback_to_secondary_endpoint() {
        let base_url = spawn_fake_exchange().await;
        let config = config();
        let http = HttpClient::new();

        let providers: Vec<Box<dyn PriceProvider>> = [
            PriceEndpoint::Coinbase,
            PriceEndpoint::CoinGecko,
            PriceEndpoint::Binance,
        ]
        .into_iter()
        .map(|endpoint| {
            Box::new(HttpPriceProvider::with_base_url(endpoint, &config, http.clone(), base_url.clone()))
                as Box<dyn PriceProvider>
        })
        .collect();
        let klines = KlinesClient::with_base_url(http.clone(), config.symbol.clone(), base_url.clone());
        let source = PriceSource::new(providers, klines);

        assert_eq!(source.current_price().await.unwrap(), 61234.5);

        let history = source.history("1h", 24).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].close, 61000.0);
    }

    #[tokio::test]
    async fn test_http_non_success_is_classified() {
        let base_url = spawn_fake_exchange().await;
        let provider = HttpPriceProvider::with_base_url(
            PriceEndpoint::Coinbase,
            &config(),
            HttpClient::new(),
            base_url,
        );
        assert_eq!(
            provider.fetch_price().await.unwrap_err(),
            ApiError::ServerError(503, "maintenance".to_string())
        );
    }
}
