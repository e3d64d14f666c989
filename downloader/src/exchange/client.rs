//! Exchange client abstraction and the Binance spot REST implementation

use crate::data::Candle;
use crate::exchange::{ConnectionProfile, ExchangeError, Timeframe};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Proxy, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Largest page Binance serves from `/api/v3/klines`
pub const BINANCE_MAX_KLINE_LIMIT: usize = 1000;

pub const BINANCE_SPOT_ENDPOINT: &str = "https://api.binance.com";

/// Last traded price for a symbol, used as the liveness probe
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: String,
    pub last_price: f64,
}

/// Market data calls the downloader needs from an exchange
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Display name, also used in output filenames
    fn name(&self) -> &str;

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError>;

    /// Up to `limit` candles whose open time is at or after `since_ms`, oldest first
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<Candle>, ExchangeError>;
}

/// Convert an ISO-8601 / RFC 3339 timestamp to epoch milliseconds
pub fn parse_iso8601_millis(input: &str) -> Result<i64, ExchangeError> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| ExchangeError::InvalidTimestamp {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

/// `BTC/USDT` -> `BTCUSDT`
pub fn market_id(symbol: &str) -> Result<String, ExchangeError> {
    let id: String = symbol.split('/').collect::<String>().trim().to_uppercase();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ExchangeError::InvalidSymbol(symbol.to_string()));
    }
    Ok(id)
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(rename = "lastPrice")]
    last_price: String,
}

/// Binance spot market data over REST
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    endpoint: String,
}

impl BinanceClient {
    /// Build a client honouring the profile's timeout and proxy
    pub fn new(profile: &ConnectionProfile) -> Result<Self, ExchangeError> {
        let mut builder = Client::builder().timeout(profile.timeout);
        if let Some(proxy_url) = &profile.proxy {
            builder = builder.proxy(Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: profile.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExchangeClient for BinanceClient {
    fn name(&self) -> &str {
        "Binance"
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
        let id = market_id(symbol)?;
        let url = format!("{}/api/v3/ticker/24hr", self.endpoint);
        let resp = self.http.get(url).query(&[("symbol", id.as_str())]).send().await?;
        let payload: TickerResponse = check_status(resp).await?.json().await?;

        let last_price = payload
            .last_price
            .parse::<f64>()
            .map_err(|_| ExchangeError::InvalidPayload(format!("lastPrice {:?}", payload.last_price)))?;

        Ok(Ticker {
            symbol: symbol.to_string(),
            last_price,
        })
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<Candle>, ExchangeError> {
        let id = market_id(symbol)?;
        let url = format!("{}/api/v3/klines", self.endpoint);
        let limit_str = limit.min(BINANCE_MAX_KLINE_LIMIT).to_string();
        let since_str = since_ms.to_string();

        debug!(symbol, %timeframe, since_ms, "requesting klines");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("symbol", id.as_str()),
                ("interval", timeframe.as_str()),
                ("startTime", since_str.as_str()),
                ("limit", limit_str.as_str()),
            ])
            .send()
            .await?;
        let rows: Vec<Vec<Value>> = check_status(resp).await?.json().await?;
        parse_kline_rows(&rows)
    }
}

async fn check_status(resp: Response) -> Result<Response, ExchangeError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
        return Err(ExchangeError::RateLimited(status.as_u16()));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ExchangeError::HttpStatus {
            code: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Decode `[openTime, open, high, low, close, volume, ...]` rows
pub fn parse_kline_rows(rows: &[Vec<Value>]) -> Result<Vec<Candle>, ExchangeError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let malformed = || ExchangeError::InvalidPayload(format!("kline row {}: {:?}", idx, row));
            if row.len() < 6 {
                return Err(malformed());
            }
            let open_time = row[0].as_i64().ok_or_else(malformed)?;
            let open = parse_f64(&row[1]).ok_or_else(malformed)?;
            let high = parse_f64(&row[2]).ok_or_else(malformed)?;
            let low = parse_f64(&row[3]).ok_or_else(malformed)?;
            let close = parse_f64(&row[4]).ok_or_else(malformed)?;
            let volume = parse_f64(&row[5]).ok_or_else(malformed)?;
            Candle::from_millis(open_time, open, high, low, close, volume).ok_or_else(malformed)
        })
        .collect()
}
