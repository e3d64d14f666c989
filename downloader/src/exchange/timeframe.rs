//! Candle bucket widths

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported kline intervals, named after their exchange code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    H6,
    H8,
    H12,
    D1,
    D3,
    W1,
    Mo1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 15] = [
        Self::M1,
        Self::M3,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H2,
        Self::H4,
        Self::H6,
        Self::H8,
        Self::H12,
        Self::D1,
        Self::D3,
        Self::W1,
        Self::Mo1,
    ];

    /// Exchange interval code, e.g. `4h`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
            Self::H6 => "6h",
            Self::H8 => "8h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::D3 => "3d",
            Self::W1 => "1w",
            Self::Mo1 => "1M",
        }
    }

    /// Upper-cased code used in output filenames, e.g. `4H`.
    ///
    /// The monthly interval is written `1MO` so its files never collide
    /// with the one-minute `1M`.
    pub fn upper(&self) -> String {
        match self {
            Self::Mo1 => "1MO".to_string(),
            _ => self.as_str().to_uppercase(),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported timeframe: {0}")]
pub struct UnknownTimeframe(pub String);

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        // `1M` (month) and `1m` (minute) differ only by case
        Self::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == code)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|tf| *tf != Self::Mo1 && tf.as_str().eq_ignore_ascii_case(code))
            })
            .ok_or_else(|| UnknownTimeframe(s.to_string()))
    }
}
