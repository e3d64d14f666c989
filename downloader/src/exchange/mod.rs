//! Exchange integration module
//!
//! Client trait, Binance REST client and startup connection selection

pub mod client;
pub mod connection;
mod error;
pub mod timeframe;

pub use client::*;
pub use connection::*;
pub use error::*;
pub use timeframe::*;
