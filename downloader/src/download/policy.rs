//! Pacing and retry limits for a download run

use std::time::Duration;

/// Limits and delays applied by the fetcher and the batch orchestrator.
///
/// The two retry bounds are independent: an attempt tolerates
/// `max_consecutive_errors` failed requests in a row, and a symbol gets
/// `max_attempts` whole-fetch attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Candles requested per batch
    pub batch_limit: usize,
    /// Sleep between two full batches
    pub batch_pause: Duration,
    /// Sleep before re-requesting after a failed batch
    pub error_backoff: Duration,
    /// Failed requests in a row an attempt tolerates; one more aborts it
    pub max_consecutive_errors: u32,
    /// Whole-fetch attempts per symbol
    pub max_attempts: u32,
    /// Multiplied by the attempt number before the next attempt
    pub attempt_backoff: Duration,
    /// Sleep between two symbols of a batch run
    pub symbol_pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            batch_limit: 1000,
            batch_pause: Duration::from_millis(200),
            error_backoff: Duration::from_secs(2),
            max_consecutive_errors: 3,
            max_attempts: 3,
            attempt_backoff: Duration::from_secs(5),
            symbol_pause: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Same limits, no sleeping at all
    pub fn without_delays() -> Self {
        Self {
            batch_pause: Duration::ZERO,
            error_backoff: Duration::ZERO,
            attempt_backoff: Duration::ZERO,
            symbol_pause: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay after failed attempt number `attempt` (1-based)
    pub fn attempt_delay(&self, attempt: u32) -> Duration {
        self.attempt_backoff * attempt
    }

    /// In-loop retries tolerated across every attempt of one symbol
    pub fn worst_case_retries(&self) -> u32 {
        self.max_consecutive_errors * self.max_attempts
    }

    /// Failed requests after which a symbol is reported failed
    pub fn worst_case_failed_requests(&self) -> u32 {
        (self.max_consecutive_errors + 1) * self.max_attempts
    }
}
