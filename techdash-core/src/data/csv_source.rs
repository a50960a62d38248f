//! CSV directory source: one `<SYMBOL>.csv` per ticker.
//!
//! The first row is a header. One column must be named `date` (any case).
//! `Open/High/Low/Close/Volume` headers are folded to the lowercase canonical
//! names; every other header is kept verbatim. Empty cells become NaN.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::provider::{DataError, SeriesSource};
use crate::domain::{PriceSeries, RAW_COLUMNS};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvDirectory {
    dir: PathBuf,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl SeriesSource for CsvDirectory {
    fn name(&self) -> &str {
        "csv"
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        list_symbols(&self.dir, "csv")
    }

    fn load(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        let path = self.path_for(symbol);
        if !path.is_file() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
                source_name: format!("csv directory {}", self.dir.display()),
            });
        }
        read_csv(symbol, &path)
    }
}

/// Parse one CSV file into a table.
pub fn read_csv(symbol: &str, path: &Path) -> Result<PriceSeries, DataError> {
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(normalize_header)
        .collect();

    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("date"))
        .ok_or_else(|| DataError::MissingDateColumn {
            path: path.to_path_buf(),
        })?;

    let mut dates = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| DataError::BadDate {
            path: path.to_path_buf(),
            row: row + 1,
            value: raw_date.to_string(),
        })?;
        dates.push(date);
        for (col, slot) in cells.iter_mut().enumerate() {
            if col != date_idx {
                slot.push(record.get(col).unwrap_or_default().to_string());
            }
        }
    }

    if dates.is_empty() {
        return Err(DataError::Empty {
            path: path.to_path_buf(),
        });
    }

    let mut series = PriceSeries::new(symbol, dates);
    for (col, (name, raw)) in headers.iter().zip(cells).enumerate() {
        if col == date_idx {
            continue;
        }
        match parse_numbers(&raw) {
            Ok(values) => series.push_column(name.as_str(), values)?,
            Err((row, value)) if RAW_COLUMNS.contains(&name.as_str()) => {
                return Err(DataError::BadNumber {
                    path: path.to_path_buf(),
                    row: row + 1,
                    column: name.clone(),
                    value,
                });
            }
            Err((row, value)) => {
                warn!(
                    path = %path.display(),
                    column = %name,
                    row = row + 1,
                    value = %value,
                    "skipping non-numeric column"
                );
            }
        }
    }

    Ok(series)
}

/// `Close` → `close` for the canonical columns, anything else unchanged.
fn normalize_header(header: &str) -> String {
    let lower = header.trim().to_ascii_lowercase();
    if RAW_COLUMNS.contains(&lower.as_str()) || lower == "date" {
        lower
    } else {
        header.trim().to_string()
    }
}

fn parse_numbers(raw: &[String]) -> Result<Vec<f64>, (usize, String)> {
    raw.iter()
        .enumerate()
        .map(|(row, cell)| {
            if cell.is_empty() {
                Ok(f64::NAN)
            } else {
                cell.replace(',', "")
                    .parse::<f64>()
                    .map_err(|_| (row, cell.clone()))
            }
        })
        .collect()
}

/// Accepts plain dates and midnight timestamps as spreadsheets export them.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .map(|dt| dt.date())
        })
}

/// File stems with the given extension, sorted.
pub(crate) fn list_symbols(dir: &Path, extension: &str) -> Result<Vec<String>, DataError> {
    let io_err = |source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut symbols = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            symbols.push(stem.to_string());
        }
    }
    symbols.sort();
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLOSE, HIGH, VOLUME};
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn loads_spreadsheet_style_headers() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "AAPL.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-02 00:00:00,187.15,188.44,183.89,185.64,82488700\n\
             2024-01-03,184.22,185.88,183.43,184.25,\n",
        );

        let source = CsvDirectory::new(dir.path());
        let series = source.load("AAPL").unwrap();

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.dates()[0],
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(series.column(CLOSE).unwrap(), &[185.64, 184.25]);
        assert_eq!(series.column(HIGH).unwrap()[1], 185.88);
        let volume = series.column(VOLUME).unwrap();
        assert_eq!(volume[0], 82_488_700.0);
        assert!(volume[1].is_nan());
    }

    #[test]
    fn extra_text_column_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "GLD.csv",
            "date,close,Note\n2024-01-02,190.1,holiday\n",
        );
        let series = CsvDirectory::new(dir.path()).load("GLD").unwrap();
        assert_eq!(series.column_names(), vec![CLOSE]);
    }

    #[test]
    fn bad_close_cell_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "X.csv", "Date,Close\n2024-01-02,abc\n");
        let err = CsvDirectory::new(dir.path()).load("X").unwrap_err();
        assert!(matches!(err, DataError::BadNumber { row: 1, ref column, .. } if column == CLOSE));
    }

    #[test]
    fn missing_date_column() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "X.csv", "Close\n1.0\n");
        let err = CsvDirectory::new(dir.path()).load("X").unwrap_err();
        assert!(matches!(err, DataError::MissingDateColumn { .. }));
    }

    #[test]
    fn bad_date_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "X.csv", "Date,Close\n2024-01-02,1\nsoon,2\n");
        let err = CsvDirectory::new(dir.path()).load("X").unwrap_err();
        assert!(matches!(err, DataError::BadDate { row: 2, .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "X.csv", "Date,Close\n");
        let err = CsvDirectory::new(dir.path()).load("X").unwrap_err();
        assert!(matches!(err, DataError::Empty { .. }));
    }

    #[test]
    fn unknown_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvDirectory::new(dir.path()).load("NVDA").unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn symbols_lists_csv_stems() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "MSFT.csv", "Date,Close\n");
        write(dir.path(), "AAPL.csv", "Date,Close\n");
        write(dir.path(), "notes.txt", "");
        let symbols = CsvDirectory::new(dir.path()).symbols().unwrap();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date("03/15/2024"), expected);
        assert_eq!(parse_date("2024-03-15T00:00:00"), expected);
        assert_eq!(parse_date("15.03.2024"), None);
    }
}
