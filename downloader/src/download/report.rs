//! Per-symbol outcomes of a batch run

use std::fmt;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Success,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub symbol: String,
    pub status: DownloadStatus,
    /// Written file on success
    pub path: Option<PathBuf>,
    /// Failure reason
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn success(symbol: impl Into<String>, path: PathBuf) -> Self {
        Self {
            symbol: symbol.into(),
            status: DownloadStatus::Success,
            path: Some(path),
            error: None,
        }
    }

    pub fn failed(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            status: DownloadStatus::Failed,
            path: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DownloadStatus::Success
    }
}

/// Counts and status listing over a run's results
#[derive(Debug, Clone)]
pub struct DownloadSummary<'a> {
    results: &'a [DownloadResult],
}

impl<'a> DownloadSummary<'a> {
    pub fn new(results: &'a [DownloadResult]) -> Self {
        Self { results }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn log(&self) {
        info!(
            succeeded = self.succeeded(),
            failed = self.failed(),
            total = self.total(),
            "batch download finished"
        );
        for result in self.results {
            info!(symbol = %result.symbol, status = %result.status, "result");
        }
    }
}

impl fmt::Display for DownloadSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Download summary")?;
        writeln!(f, "  succeeded: {}/{}", self.succeeded(), self.total())?;
        writeln!(f, "  failed:    {}/{}", self.failed(), self.total())?;
        writeln!(f)?;
        writeln!(f, "Details:")?;
        for result in self.results {
            let mark = if result.is_success() { "+" } else { "-" };
            write!(f, "  {} {}: {}", mark, result.symbol, result.status)?;
            match (&result.path, &result.error) {
                (Some(path), _) => writeln!(f, " ({})", path.display())?,
                (None, Some(err)) => writeln!(f, " ({})", err)?,
                (None, None) => writeln!(f)?,
            }
        }
        Ok(())
    }
}
