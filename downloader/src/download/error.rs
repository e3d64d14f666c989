use crate::data::StorageError;
use crate::exchange::ExchangeError;
use chrono::NaiveDate;
use thiserror::Error;

/// Why a symbol could not be downloaded or saved
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("end date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    /// One attempt gave up after too many failed requests in a row
    #[error("{symbol}: {errors} consecutive request errors, last: {last}")]
    TooManyErrors {
        symbol: String,
        errors: u32,
        #[source]
        last: ExchangeError,
    },

    /// Every whole-fetch attempt failed
    #[error("{symbol}: all {attempts} attempts failed, last: {last}")]
    AttemptsExhausted {
        symbol: String,
        attempts: u32,
        #[source]
        last: Box<DownloadError>,
    },

    #[error("{0}: exchange returned no candles")]
    NoData(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
