use thiserror::Error;

/// A single failed exchange request
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("rate limited by exchange (status {0})")]
    RateLimited(u16),

    #[error("unexpected response: {0}")]
    InvalidPayload(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },
}

/// No connection profile passed its liveness probe
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("no connection profile reachable (tried: {}); last error: {last}", .tried.join(", "))]
    Unreachable { tried: Vec<String>, last: String },

    #[error("no connection profiles configured")]
    NoProfiles,
}
