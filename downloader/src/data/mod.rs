//! Data management module
//!
//! OHLCV candle series and their CSV storage.

pub mod candle;
pub mod storage;

pub use candle::*;
pub use storage::*;
