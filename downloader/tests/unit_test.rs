//! Unit tests for the public building blocks of ohlcv-downloader

#[cfg(test)]
mod tests {
    use ohlcv_downloader::data::{Candle, CandleSeries};
    use ohlcv_downloader::download::{DateRange, DownloadResult, RetryPolicy};
    use ohlcv_downloader::exchange::{market_id, parse_iso8601_millis, Timeframe};
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_candle_creation() {
        let candle = Candle::from_millis(1_707_955_200_000, 100.0, 110.0, 95.0, 105.0, 1000.0).unwrap();

        assert_eq!(candle.open, 100.0);
        assert_eq!(candle.high, 110.0);
        assert_eq!(candle.low, 95.0);
        assert_eq!(candle.close, 105.0);
        assert_eq!(candle.volume, 1000.0);
        assert_eq!(candle.timestamp.to_rfc3339(), "2024-02-15T00:00:00+00:00");
    }

    #[test]
    fn test_candle_series_is_strictly_ascending() {
        let candles = (0..10)
            .rev()
            .chain(3..6)
            .map(|i| Candle::from_millis(i * 60_000, 1.0, 1.0, 1.0, 1.0, 1.0).unwrap())
            .collect();
        let series = CandleSeries::from_vec("BTC/USDT", Timeframe::M1, candles);

        assert_eq!(series.len(), 10);
        assert!(series
            .candles()
            .windows(2)
            .all(|w| w[0].timestamp_millis() < w[1].timestamp_millis()));
    }

    #[test]
    fn test_retry_ceiling() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_consecutive_errors, 3);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.worst_case_retries(), 9);
        assert_eq!(policy.batch_pause, Duration::from_millis(200));
        assert_eq!(policy.symbol_pause, Duration::from_secs(2));
    }

    #[test]
    fn test_date_range_matches_exchange_conversion() {
        let range = DateRange::parse("2023-02-15", Some("2024-02-15")).unwrap();
        assert_eq!(
            range.start_millis().unwrap(),
            parse_iso8601_millis("2023-02-15T00:00:00Z").unwrap()
        );
        assert_eq!(
            range.end_millis().unwrap(),
            Some(parse_iso8601_millis("2024-02-15T23:59:59Z").unwrap())
        );
    }

    #[test]
    fn test_prelude_exports_both_error_families() {
        use ohlcv_downloader::prelude::{ConnectionError, DownloadError};

        let download = DownloadError::NoData("BTC/USDT".to_string());
        assert_eq!(download.to_string(), "BTC/USDT: exchange returned no candles");
        let connection = ConnectionError::NoProfiles;
        assert_eq!(connection.to_string(), "no connection profiles configured");
    }

    #[test]
    fn test_symbol_helpers() {
        assert_eq!(market_id("ETH/USDT").unwrap(), "ETHUSDT");
        assert!(DownloadResult::success("ETH/USDT", PathBuf::from("x.csv")).is_success());
        assert!(!DownloadResult::failed("ETH/USDT", "boom").is_success());
    }
}
