//! Configuration module
//!
//! Everything is read from the environment (and `.env`), with defaults that
//! reproduce a plain Binance 4h download of the five majors.

use crate::exchange::{ConnectionProfile, Timeframe, BINANCE_SPOT_ENDPOINT};
use anyhow::{anyhow, Context};
use dotenv::dotenv;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SYMBOLS: [&str; 5] = ["BTC/USDT", "ETH/USDT", "XRP/USDT", "SOL/USDT", "DOGE/USDT"];
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:7890";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub symbols: Vec<String>,
    pub timeframe: Timeframe,
    pub endpoint: String,
    pub timeout: Duration,
    pub proxy_url: Option<String>,
    pub probe_symbol: String,
    /// Preset number that skips the range prompt
    pub date_preset: Option<String>,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let symbols = match get("SYMBOLS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_uppercase)
                .collect::<Vec<_>>(),
            None => DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };
        if symbols.is_empty() {
            return Err(anyhow!("SYMBOLS must name at least one pair"));
        }

        let timeframe = get("TIMEFRAME")
            .unwrap_or_else(|| "4h".to_string())
            .parse::<Timeframe>()
            .context("invalid TIMEFRAME")?;

        let timeout_ms = match get("EXCHANGE_TIMEOUT_MS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("invalid EXCHANGE_TIMEOUT_MS: {}", v))?,
            None => 30_000,
        };

        // an explicitly empty PROXY_URL disables the proxy profile
        let proxy_url = match lookup("PROXY_URL") {
            None => Some(DEFAULT_PROXY_URL.to_string()),
            Some(v) if v.trim().is_empty() || v.trim().eq_ignore_ascii_case("none") => None,
            Some(v) => Some(v.trim().to_string()),
        };

        let assume_yes = match get("ASSUME_YES") {
            Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "y"),
            None => false,
        };

        Ok(Config {
            data_dir: PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "trading_data/raw".to_string())),
            symbols,
            timeframe,
            endpoint: get("BINANCE_BASE_URL").unwrap_or_else(|| BINANCE_SPOT_ENDPOINT.to_string()),
            timeout: Duration::from_millis(timeout_ms),
            proxy_url,
            probe_symbol: get("PROBE_SYMBOL").unwrap_or_else(|| "BTC/USDT".to_string()),
            date_preset: get("DATE_PRESET"),
            assume_yes,
        })
    }

    /// Direct first, then through the proxy when one is configured
    pub fn connection_profiles(&self) -> Vec<ConnectionProfile> {
        let mut profiles = vec![ConnectionProfile::direct(
            "Binance direct",
            self.endpoint.clone(),
            self.timeout,
        )];
        if let Some(proxy) = &self.proxy_url {
            profiles.push(ConnectionProfile::proxied(
                format!("Binance proxy ({})", proxy),
                self.endpoint.clone(),
                self.timeout,
                proxy.clone(),
            ));
        }
        profiles
    }
}
