//! Calendar date ranges and their millisecond bounds

use crate::download::DownloadError;
use crate::exchange::parse_iso8601_millis;
use chrono::NaiveDate;
use std::fmt;

/// Days to download; the end day is covered through 23:59:59 UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, DownloadError> {
        if let Some(end) = end {
            if end < start {
                return Err(DownloadError::InvalidDateRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: Option<&str>) -> Result<Self, DownloadError> {
        let day = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| DownloadError::InvalidDate(s.to_string()))
        };
        Self::new(day(start)?, end.map(day).transpose()?)
    }

    /// First millisecond of the start day
    pub fn start_millis(&self) -> Result<i64, DownloadError> {
        Ok(parse_iso8601_millis(&format!("{}T00:00:00Z", self.start.format("%Y-%m-%d")))?)
    }

    /// 23:59:59 of the end day, if an end is set
    pub fn end_millis(&self) -> Result<Option<i64>, DownloadError> {
        self.end
            .map(|end| parse_iso8601_millis(&format!("{}T23:59:59Z", end.format("%Y-%m-%d"))))
            .transpose()
            .map_err(DownloadError::from)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} to {}", self.start, end),
            None => write!(f, "{} to now", self.start),
        }
    }
}
