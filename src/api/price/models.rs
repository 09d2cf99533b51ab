//! Response shapes of the price endpoints

use std::collections::HashMap;

use serde::Deserialize;

/// `GET /v2/exchange-rates?currency=BTC` (Coinbase)
#[derive(Debug, Deserialize)]
pub struct CoinbaseRatesResponse {
    pub data: CoinbaseRates,
}

#[derive(Debug, Deserialize)]
pub struct CoinbaseRates {
    pub rates: HashMap<String, String>,
}

/// `GET /api/v3/simple/price?ids=bitcoin&vs_currencies=usd` (CoinGecko)
pub type CoinGeckoSimplePrice = HashMap<String, HashMap<String, f64>>;

/// `GET /api/v3/ticker/price?symbol=BTCUSDT` (Binance)
#[derive(Debug, Deserialize)]
pub struct BinanceTickerPrice {
    pub price: String,
}

/// One row of `GET /api/v3/klines`:
/// `[open_time, open, high, low, close, volume, close_time, ...]`
pub type BinanceKline = Vec<serde_json::Value>;
