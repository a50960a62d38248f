//! Parquet directory source: one `<SYMBOL>.parquet` per ticker.
//!
//! Expects a `date` column of Date or Datetime dtype. Every other column that
//! casts to Float64 becomes a table column; nulls become NaN.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::csv_source::list_symbols;
use super::provider::{DataError, SeriesSource};
use crate::domain::{PriceSeries, RAW_COLUMNS};

pub struct ParquetDirectory {
    dir: PathBuf,
}

impl ParquetDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.parquet"))
    }
}

impl SeriesSource for ParquetDirectory {
    fn name(&self) -> &str {
        "parquet"
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        list_symbols(&self.dir, "parquet")
    }

    fn load(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
                source_name: format!("parquet directory {}", self.dir.display()),
            });
        }
        read_parquet(symbol, &path)
    }
}

/// Read one Parquet file into a table.
pub fn read_parquet(symbol: &str, path: &Path) -> Result<PriceSeries, DataError> {
    let file = fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| DataError::Parquet(format!("read {}: {e}", path.display())))?;
    dataframe_to_series(symbol, &df, path)
}

fn dataframe_to_series(symbol: &str, df: &DataFrame, path: &Path) -> Result<PriceSeries, DataError> {
    let map_err = |e: PolarsError| DataError::Parquet(format!("{}: {e}", path.display()));

    if df.height() == 0 {
        return Err(DataError::Empty {
            path: path.to_path_buf(),
        });
    }

    let date_name = df
        .get_column_names()
        .into_iter()
        .find(|n| n.as_str().eq_ignore_ascii_case("date"))
        .map(|n| n.to_string())
        .ok_or_else(|| DataError::MissingDateColumn {
            path: path.to_path_buf(),
        })?;

    let date_col = df.column(&date_name).map_err(map_err)?;
    // Datetime indexes (pandas, polars) truncate to the calendar day.
    let date_col = match date_col.dtype() {
        DataType::Datetime(..) => date_col.cast(&DataType::Date).map_err(map_err)?,
        _ => date_col.clone(),
    };
    let date_ca = date_col.date().map_err(map_err)?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).ok_or_else(|| DataError::Parquet("epoch".into()))?;

    let n = df.height();
    let mut dates = Vec::with_capacity(n);
    for i in 0..n {
        let days = date_ca.get(i).ok_or_else(|| DataError::BadDate {
            path: path.to_path_buf(),
            row: i + 1,
            value: "null".into(),
        })?;
        dates.push(epoch + chrono::Duration::days(days as i64));
    }

    let mut series = PriceSeries::new(symbol, dates);
    for column in df.get_columns() {
        let raw_name = column.name().as_str();
        if raw_name == date_name {
            continue;
        }
        let lower = raw_name.to_ascii_lowercase();
        let name = if RAW_COLUMNS.contains(&lower.as_str()) {
            lower
        } else {
            raw_name.to_string()
        };

        let casted = match column.cast(&DataType::Float64) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), column = %name, error = %e, "skipping non-numeric column");
                continue;
            }
        };
        let ca = casted.f64().map_err(map_err)?;
        let values: Vec<f64> = (0..n).map(|i| ca.get(i).unwrap_or(f64::NAN)).collect();
        series.push_column(name, values)?;
    }

    Ok(series)
}
