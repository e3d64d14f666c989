//! OHLCV history downloader
//!
//! Pulls historical candlesticks for a list of spot pairs from Binance and
//! writes one CSV per pair.
//!
//! # Features
//!
//! - **Connection selection**: ordered profiles (direct, proxied), first one
//!   answering a ticker probe wins
//! - **Paginated fetching**: 1000-candle pages with cursor advance, bounded
//!   in-loop retries and whole-fetch retries
//! - **Batch runs**: sequential symbols with pacing and a success/failure summary
//! - **CSV storage**: `time,open,high,low,close,volume` files, written atomically
//!
//! # Example
//!
//! ```no_run
//! use ohlcv_downloader::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::from_env()?;
//!     let (client, _) = select_connection(&config.connection_profiles(), &config.probe_symbol).await?;
//!     let downloader = BatchDownloader::new(client, CsvStorage::new(&config.data_dir), RetryPolicy::default());
//!     let range = DateRange::parse("2024-02-15", None)?;
//!     let results = downloader.run(&config.symbols, &range, config.timeframe).await;
//!     println!("{}", DownloadSummary::new(&results));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod download;
pub mod exchange;
pub mod menu;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::download::*;
    pub use crate::exchange::*;
    pub use crate::menu::*;

    pub use anyhow::{Context, Result};
}

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
