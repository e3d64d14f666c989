//! OHLCV candle data structures

use crate::exchange::Timeframe;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time
    pub timestamp: DateTime<Utc>,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Build a candle from an exchange tuple whose time is epoch milliseconds.
    ///
    /// Returns `None` when the millisecond value is outside chrono's range.
    pub fn from_millis(
        timestamp_ms: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Option<Self> {
        let timestamp = Utc.timestamp_millis_opt(timestamp_ms).single()?;
        Some(Self::new(timestamp, open, high, low, close, volume))
    }

    /// Timestamp as epoch milliseconds
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Ordered candles for one (symbol, timeframe) pair
#[derive(Debug, Clone)]
pub struct CandleSeries {
    symbol: String,
    timeframe: Timeframe,
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create new empty series
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            candles: Vec::new(),
        }
    }

    /// Create from vector of candles.
    ///
    /// The candles are sorted ascending by timestamp and any repeated
    /// timestamp keeps only its first occurrence, so a series is always
    /// strictly increasing in time.
    pub fn from_vec(symbol: impl Into<String>, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        let mut series = Self {
            symbol: symbol.into(),
            timeframe,
            candles,
        };
        series.sort_by_time();
        series
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get first candle
    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    /// Get last candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Drop every candle opening after `end_ms` (inclusive bound)
    pub fn truncate_after(&mut self, end_ms: i64) {
        self.candles.retain(|c| c.timestamp_millis() <= end_ms);
    }

    /// Sort by timestamp (oldest first) and drop duplicate timestamps
    pub fn sort_by_time(&mut self) {
        // stable sort keeps the first-received copy ahead of any repeat
        self.candles.sort_by_key(|c| c.timestamp);
        self.candles.dedup_by_key(|c| c.timestamp);
    }
}
