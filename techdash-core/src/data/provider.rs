//! Series source trait and structured error types.
//!
//! The SeriesSource trait abstracts over where price tables come from (a
//! directory of CSV exports, Parquet files, synthetic data) so the dashboard
//! can swap implementations and tests can mock them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use super::canonicalize::Canonicalizer;
use crate::domain::{PriceSeries, SeriesError};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: no date column")]
    MissingDateColumn { path: PathBuf },

    #[error("{path} row {row}: cannot parse date '{value}'")]
    BadDate {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{path} row {row}: cannot parse '{value}' in column '{column}'")]
    BadNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{path}: no data rows")]
    Empty { path: PathBuf },

    #[error("no data for symbol '{symbol}' in {source_name}")]
    SymbolNotFound { symbol: String, source_name: String },

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Which kind of source to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Csv,
    Parquet,
    Synthetic,
}

/// Trait for price-series sources.
pub trait SeriesSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Symbols this source can serve, sorted.
    fn symbols(&self) -> Result<Vec<String>, DataError>;

    /// Load the raw table for one symbol. No ordering guarantees.
    fn load(&self, symbol: &str) -> Result<PriceSeries, DataError>;
}

/// Load a symbol and canonicalize it (sorted ascending, unique dates).
///
/// Anomalies found on the way are logged, not returned as errors.
pub fn load_canonical(source: &dyn SeriesSource, symbol: &str) -> Result<PriceSeries, DataError> {
    let raw = source.load(symbol)?;
    let canonical = Canonicalizer::canonicalize(&raw);
    for anomaly in &canonical.anomalies {
        warn!(
            symbol,
            source = source.name(),
            kind = ?anomaly.anomaly_type,
            count = anomaly.count,
            severity = ?anomaly.severity,
            "data anomaly"
        );
    }
    info!(
        symbol,
        source = source.name(),
        rows = canonical.series.len(),
        "loaded series"
    );
    Ok(canonical.series)
}
