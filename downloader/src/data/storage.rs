//! CSV persistence for candle series

use crate::data::{Candle, CandleSeries};
use chrono::NaiveDateTime;
use csv::{Reader, Writer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Column layout of every written file
pub const CSV_HEADER: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

/// UTC wall-clock time; fractional seconds appear only when non-zero
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("refusing to write empty series for {0}")]
    EmptySeries(String),

    #[error("malformed row {row}: {reason}")]
    Parse { row: usize, reason: String },
}

/// A file written by [`CsvStorage::save`]
#[derive(Debug, Clone)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

impl SavedFile {
    pub fn size_kb(&self) -> f64 {
        self.bytes as f64 / 1024.0
    }
}

/// Writes one CSV file per series under a data directory
#[derive(Debug, Clone)]
pub struct CsvStorage {
    data_dir: PathBuf,
}

impl CsvStorage {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory if it does not exist yet
    pub fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir).map_err(|source| StorageError::Io {
            path: self.data_dir.clone(),
            source,
        })
    }

    /// Write `series` to `<data_dir>/<filename>`.
    ///
    /// Rows go to a `.part` sibling first and are renamed into place once
    /// flushed, so a failure never leaves a truncated CSV behind.
    pub fn save(&self, series: &CandleSeries, filename: &str) -> Result<SavedFile, StorageError> {
        if series.is_empty() {
            return Err(StorageError::EmptySeries(series.symbol().to_string()));
        }
        self.ensure_dir()?;

        let path = self.data_dir.join(filename);
        let partial = path.with_extension("csv.part");

        if let Err(e) = write_rows(&partial, series.candles()) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        if let Err(source) = fs::rename(&partial, &path) {
            let _ = fs::remove_file(&partial);
            return Err(StorageError::Io { path, source });
        }

        let bytes = fs::metadata(&path)
            .map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?
            .len();

        let saved = SavedFile { path, bytes };
        info!(
            path = %saved.path.display(),
            size_kb = %format!("{:.2}", saved.size_kb()),
            rows = series.len(),
            "series saved"
        );
        Ok(saved)
    }

    /// Read candles back from a file written by [`CsvStorage::save`]
    pub fn load(&self, path: &Path) -> Result<Vec<Candle>, StorageError> {
        let mut reader = Reader::from_path(path)?;
        let mut candles = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = idx + 1;
            if record.len() < CSV_HEADER.len() {
                return Err(StorageError::Parse {
                    row,
                    reason: format!("expected {} fields, got {}", CSV_HEADER.len(), record.len()),
                });
            }

            let timestamp = NaiveDateTime::parse_from_str(&record[0], TIME_FORMAT)
                .map_err(|e| StorageError::Parse {
                    row,
                    reason: format!("time {:?}: {}", &record[0], e),
                })?
                .and_utc();

            let field = |i: usize| -> Result<f64, StorageError> {
                record[i].parse::<f64>().map_err(|e| StorageError::Parse {
                    row,
                    reason: format!("{} {:?}: {}", CSV_HEADER[i], &record[i], e),
                })
            };

            candles.push(Candle::new(
                timestamp,
                field(1)?,
                field(2)?,
                field(3)?,
                field(4)?,
                field(5)?,
            ));
        }

        Ok(candles)
    }
}

fn write_rows(path: &Path, candles: &[Candle]) -> Result<(), StorageError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;

    for candle in candles {
        writer.write_record([
            candle.timestamp.format(TIME_FORMAT).to_string(),
            candle.open.to_string(),
            candle.high.to_string(),
            candle.low.to_string(),
            candle.close.to_string(),
            candle.volume.to_string(),
        ])?;
    }

    writer.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
