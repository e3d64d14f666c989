//! Paginated candle download for a single symbol

use crate::data::{Candle, CandleSeries};
use crate::download::{DateRange, DownloadError, RetryPolicy};
use crate::exchange::{ExchangeClient, Timeframe};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Walks a date range in `batch_limit`-sized pages and stitches the pages
/// into one series.
pub struct SeriesFetcher<'a, C: ExchangeClient + ?Sized> {
    client: &'a C,
    policy: &'a RetryPolicy,
}

impl<'a, C: ExchangeClient + ?Sized> SeriesFetcher<'a, C> {
    pub fn new(client: &'a C, policy: &'a RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Download `symbol` over `range`, retrying whole attempts.
    ///
    /// Returns `Ok(None)` when the exchange has no candles for the range.
    /// After `max_attempts` failed attempts the last failure is wrapped in
    /// [`DownloadError::AttemptsExhausted`].
    pub async fn fetch_series(
        &self,
        symbol: &str,
        range: &DateRange,
        timeframe: Timeframe,
    ) -> Result<Option<CandleSeries>, DownloadError> {
        let since = range.start_millis()?;
        let end = range.end_millis()?;

        let mut attempt = 1;
        loop {
            match self.fetch_attempt(symbol, timeframe, since, end).await {
                Ok(series) => return Ok(series),
                Err(e) if attempt >= self.policy.max_attempts => {
                    error!(symbol, attempts = attempt, error = %e, "download failed, giving up");
                    return Err(DownloadError::AttemptsExhausted {
                        symbol: symbol.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let wait = self.policy.attempt_delay(attempt);
                    warn!(
                        symbol,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "download attempt failed, retrying"
                    );
                    sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One pass over `[since, end]`.
    ///
    /// A failed request is retried at the same cursor, keeping the candles
    /// already received, until more than `max_consecutive_errors` requests
    /// fail in a row.
    pub async fn fetch_attempt(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        since: i64,
        end: Option<i64>,
    ) -> Result<Option<CandleSeries>, DownloadError> {
        let limit = self.policy.batch_limit;
        let mut cursor = since;
        let mut candles: Vec<Candle> = Vec::new();
        let mut batches = 0u32;
        let mut consecutive_errors = 0u32;

        loop {
            let batch = match self.client.fetch_ohlcv(symbol, timeframe, cursor, limit).await {
                Ok(batch) => batch,
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors > self.policy.max_consecutive_errors {
                        return Err(DownloadError::TooManyErrors {
                            symbol: symbol.to_string(),
                            errors: consecutive_errors,
                            last: e,
                        });
                    }
                    warn!(
                        symbol,
                        cursor,
                        errors = consecutive_errors,
                        max_errors = self.policy.max_consecutive_errors,
                        error = %e,
                        "batch request failed, retrying"
                    );
                    sleep(self.policy.error_backoff).await;
                    continue;
                }
            };
            consecutive_errors = 0;

            let Some(last) = batch.last() else {
                break;
            };
            let next = last.timestamp_millis() + 1;
            let received = batch.len();
            batches += 1;
            candles.extend(batch);

            if next <= cursor {
                warn!(symbol, cursor, "exchange returned candles before the cursor, stopping");
                break;
            }
            cursor = next;
            debug!(symbol, batch = batches, received, total = candles.len(), cursor, "batch received");

            if end.is_some_and(|end| cursor >= end) {
                break;
            }
            if received < limit {
                break;
            }
            sleep(self.policy.batch_pause).await;
        }

        if candles.is_empty() {
            info!(symbol, "no candles in range");
            return Ok(None);
        }

        let mut series = CandleSeries::from_vec(symbol, timeframe, candles);
        if let Some(end) = end {
            series.truncate_after(end);
        }

        if let (Some(first), Some(last)) = (series.first(), series.last()) {
            info!(
                symbol,
                batches,
                candles = series.len(),
                from = %first.timestamp,
                to = %last.timestamp,
                "download complete"
            );
        }

        if series.is_empty() {
            Ok(None)
        } else {
            Ok(Some(series))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{ExchangeError, Ticker};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const HOUR_MS: i64 = 3_600_000;
    const START_MS: i64 = 1_707_955_200_000; // 2024-02-15T00:00:00Z

    /// Serves hourly candles from an in-memory history; `plan` decides per
    /// call whether the request fails.
    struct FakeExchange {
        history: Vec<Candle>,
        plan: Mutex<VecDeque<bool>>,
        cursors: Mutex<Vec<i64>>,
    }

    impl FakeExchange {
        fn hourly(count: usize) -> Self {
            let history = (0..count as i64)
                .map(|i| Candle::from_millis(START_MS + i * HOUR_MS, 1.0, 2.0, 0.5, 1.5, 10.0).unwrap())
                .collect();
            Self {
                history,
                plan: Mutex::new(VecDeque::new()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn failing_first(self, n: usize) -> Self {
            *self.plan.lock().unwrap() = std::iter::repeat(true).take(n).collect();
            self
        }

        fn calls(&self) -> Vec<i64> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeClient for FakeExchange {
        fn name(&self) -> &str {
            "Fake"
        }

        async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ExchangeError> {
            Ok(Ticker {
                symbol: symbol.to_string(),
                last_price: 1.0,
            })
        }

        async fn fetch_ohlcv(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            since_ms: i64,
            limit: usize,
        ) -> Result<Vec<Candle>, ExchangeError> {
            self.cursors.lock().unwrap().push(since_ms);
            if self.plan.lock().unwrap().pop_front().unwrap_or(false) {
                return Err(ExchangeError::RateLimited(429));
            }
            Ok(self
                .history
                .iter()
                .filter(|c| c.timestamp_millis() >= since_ms)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    fn policy(batch_limit: usize) -> RetryPolicy {
        RetryPolicy {
            batch_limit,
            ..RetryPolicy::without_delays()
        }
    }

    fn open_range() -> DateRange {
        DateRange::parse("2024-02-15", None).unwrap()
    }

    #[tokio::test]
    async fn test_pages_are_stitched_without_duplicates() {
        let exchange = FakeExchange::hourly(25);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher.fetch_series("BTC/USDT", &open_range(), Timeframe::H1).await.unwrap().unwrap();

        assert_eq!(series.len(), 25);
        let times: Vec<i64> = series.candles().iter().map(Candle::timestamp_millis).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        // 10 + 10 + 5: the short third page ends the loop
        assert_eq!(
            exchange.calls(),
            vec![START_MS, START_MS + 9 * HOUR_MS + 1, START_MS + 19 * HOUR_MS + 1]
        );
    }

    #[tokio::test]
    async fn test_short_batch_stops_immediately() {
        let exchange = FakeExchange::hourly(7);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher.fetch_series("BTC/USDT", &open_range(), Timeframe::H1).await.unwrap().unwrap();
        assert_eq!(series.len(), 7);
        assert_eq!(exchange.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_on_empty_batch() {
        let exchange = FakeExchange::hourly(20);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher.fetch_series("BTC/USDT", &open_range(), Timeframe::H1).await.unwrap().unwrap();
        assert_eq!(series.len(), 20);
        assert_eq!(exchange.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_end_bound_is_inclusive_and_enforced() {
        // 3 days of hourly candles, ask for the first day only
        let exchange = FakeExchange::hourly(72);
        let policy = policy(50);
        let fetcher = SeriesFetcher::new(&exchange, &policy);
        let range = DateRange::parse("2024-02-15", Some("2024-02-15")).unwrap();
        let end = range.end_millis().unwrap().unwrap();

        let series = fetcher.fetch_series("BTC/USDT", &range, Timeframe::H1).await.unwrap().unwrap();

        assert_eq!(series.len(), 24);
        assert!(series.candles().iter().all(|c| c.timestamp_millis() <= end));
        // the cursor passed the end after the first page
        assert_eq!(exchange.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_three_errors_in_a_row_are_tolerated() {
        let exchange = FakeExchange::hourly(15).failing_first(3);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher.fetch_series("BTC/USDT", &open_range(), Timeframe::H1).await.unwrap().unwrap();

        assert_eq!(series.len(), 15);
        // three failures at the start cursor, then two good pages
        let calls = exchange.calls();
        assert_eq!(calls.len(), 5);
        assert!(calls[..4].iter().all(|&c| c == START_MS));
    }

    #[tokio::test]
    async fn test_retry_keeps_accumulated_candles() {
        let exchange = FakeExchange::hourly(25);
        // page 1 ok, then two failures, then the rest
        *exchange.plan.lock().unwrap() = VecDeque::from(vec![false, true, true]);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher
            .fetch_attempt("BTC/USDT", Timeframe::H1, START_MS, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(series.len(), 25);
        let resumed = START_MS + 9 * HOUR_MS + 1;
        assert_eq!(&exchange.calls()[1..4], &[resumed, resumed, resumed]);
    }

    #[tokio::test]
    async fn test_four_errors_in_a_row_abort_the_attempt() {
        let exchange = FakeExchange::hourly(15).failing_first(4);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let err = fetcher
            .fetch_attempt("BTC/USDT", Timeframe::H1, START_MS, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::TooManyErrors { errors: 4, .. }));
        assert_eq!(exchange.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_second_attempt_recovers() {
        // first attempt burns 4 failures, second attempt succeeds
        let exchange = FakeExchange::hourly(5).failing_first(4);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher.fetch_series("BTC/USDT", &open_range(), Timeframe::H1).await.unwrap().unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(exchange.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_all_attempts_exhausted() {
        let exchange = FakeExchange::hourly(5).failing_first(100);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let err = fetcher
            .fetch_series("FAKE/XXX", &open_range(), Timeframe::H1)
            .await
            .unwrap_err();

        match err {
            DownloadError::AttemptsExhausted { symbol, attempts, last } => {
                assert_eq!(symbol, "FAKE/XXX");
                assert_eq!(attempts, 3);
                assert!(matches!(*last, DownloadError::TooManyErrors { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(exchange.calls().len() as u32, policy.worst_case_failed_requests());
    }

    #[tokio::test]
    async fn test_empty_history_is_none() {
        let exchange = FakeExchange::hourly(0);
        let policy = policy(10);
        let fetcher = SeriesFetcher::new(&exchange, &policy);

        let series = fetcher.fetch_series("BTC/USDT", &open_range(), Timeframe::H1).await.unwrap();
        assert!(series.is_none());
        assert_eq!(exchange.calls().len(), 1);
    }
}
