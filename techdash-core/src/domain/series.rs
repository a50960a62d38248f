//! PriceSeries — a date-indexed table of named numeric columns.
//!
//! Every column has exactly one value per date. Missing cells are `f64::NAN`;
//! there is no separate null representation inside the table.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::PriceBar;

pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";

/// Canonical raw column names, in table order.
pub const RAW_COLUMNS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("column '{name}' has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// A named column of the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedColumn {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    dates: Vec<NaiveDate>,
    columns: Vec<NamedColumn>,
}

impl PriceSeries {
    /// An empty table over the given date index.
    pub fn new(symbol: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        Self {
            symbol: symbol.into(),
            dates,
            columns: Vec::new(),
        }
    }

    /// Builder form of [`push_column`](Self::push_column).
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Append a new column. Fails if the name is taken or the length is wrong.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(SeriesError::DuplicateColumn(name));
        }
        self.check_length(&name, &values)?;
        self.columns.push(NamedColumn { name, values });
        Ok(())
    }

    /// Replace a column in place, or append it if absent.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SeriesError> {
        let name = name.into();
        self.check_length(&name, &values)?;
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(NamedColumn { name, values }),
        }
        Ok(())
    }

    fn check_length(&self, name: &str, values: &[f64]) -> Result<(), SeriesError> {
        if values.len() != self.dates.len() {
            return Err(SeriesError::LengthMismatch {
                name: name.to_string(),
                expected: self.dates.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// Build a table from row-shaped bars.
    ///
    /// The `volume` column is only created when at least one bar carries a volume;
    /// bars without one get NaN in that column.
    pub fn from_bars(symbol: impl Into<String>, bars: &[PriceBar]) -> Self {
        let dates = bars.iter().map(|b| b.date).collect();
        let mut columns = vec![
            NamedColumn {
                name: OPEN.into(),
                values: bars.iter().map(|b| b.open).collect(),
            },
            NamedColumn {
                name: HIGH.into(),
                values: bars.iter().map(|b| b.high).collect(),
            },
            NamedColumn {
                name: LOW.into(),
                values: bars.iter().map(|b| b.low).collect(),
            },
            NamedColumn {
                name: CLOSE.into(),
                values: bars.iter().map(|b| b.close).collect(),
            },
        ];
        if bars.iter().any(|b| b.volume.is_some()) {
            columns.push(NamedColumn {
                name: VOLUME.into(),
                values: bars.iter().map(|b| b.volume.unwrap_or(f64::NAN)).collect(),
            });
        }
        Self {
            symbol: symbol.into(),
            dates,
            columns,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Row view at `index`. `None` when out of range or when any OHLC column is absent.
    pub fn bar(&self, index: usize) -> Option<PriceBar> {
        let date = *self.dates.get(index)?;
        Some(PriceBar {
            date,
            open: *self.column(OPEN)?.get(index)?,
            high: *self.column(HIGH)?.get(index)?,
            low: *self.column(LOW)?.get(index)?,
            close: *self.column(CLOSE)?.get(index)?,
            volume: self
                .column(VOLUME)
                .and_then(|v| v.get(index).copied())
                .filter(|v| !v.is_nan()),
        })
    }

    /// Index of the first row whose date is not strictly after its predecessor.
    pub fn first_unordered(&self) -> Option<usize> {
        self.dates
            .windows(2)
            .position(|w| w[1] <= w[0])
            .map(|i| i + 1)
    }

    /// A new table containing only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            symbol: self.symbol.clone(),
            dates: rows.iter().map(|&i| self.dates[i]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| NamedColumn {
                    name: c.name.clone(),
                    values: rows.iter().map(|&i| c.values[i]).collect(),
                })
                .collect(),
        }
    }

    /// A copy with rows stably sorted ascending by date. Duplicates are kept.
    pub fn sorted_by_date(&self) -> Self {
        let mut rows: Vec<usize> = (0..self.len()).collect();
        rows.sort_by_key(|&i| self.dates[i]);
        self.select_rows(&rows)
    }

    /// BLAKE3 digest over the date index and every column.
    ///
    /// NaN cells hash to the same bytes regardless of payload.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for date in &self.dates {
            hasher.update(&date.num_days_from_ce().to_le_bytes());
        }
        for column in &self.columns {
            hasher.update(column.name.as_bytes());
            for v in &column.values {
                let bits = if v.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    v.to_bits()
                };
                hasher.update(&bits.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample() -> PriceSeries {
        PriceSeries::new("AAPL", vec![d(2), d(3), d(4)])
            .with_column(CLOSE, vec![10.0, 11.0, 12.0])
            .unwrap()
    }

    #[test]
    fn push_rejects_length_mismatch() {
        let mut s = sample();
        let err = s.push_column("x", vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::LengthMismatch {
                name: "x".into(),
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn push_rejects_duplicate() {
        let mut s = sample();
        let err = s.push_column(CLOSE, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, SeriesError::DuplicateColumn(CLOSE.into()));
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut s = sample();
        s.push_column("x", vec![0.0; 3]).unwrap();
        s.set_column(CLOSE, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.column_names(), vec![CLOSE, "x"]);
        assert_eq!(s.column(CLOSE).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn first_unordered_detects_duplicate_and_descending() {
        assert_eq!(sample().first_unordered(), None);
        let dup = PriceSeries::new("X", vec![d(2), d(3), d(3)]);
        assert_eq!(dup.first_unordered(), Some(2));
        let desc = PriceSeries::new("X", vec![d(4), d(3)]);
        assert_eq!(desc.first_unordered(), Some(1));
    }

    #[test]
    fn sorted_by_date_moves_all_columns() {
        let s = PriceSeries::new("X", vec![d(4), d(2), d(3)])
            .with_column(CLOSE, vec![3.0, 1.0, 2.0])
            .unwrap();
        let sorted = s.sorted_by_date();
        assert_eq!(sorted.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(sorted.column(CLOSE).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn from_bars_omits_volume_when_absent() {
        let bars = vec![PriceBar {
            date: d(2),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: None,
        }];
        let s = PriceSeries::from_bars("GLD", &bars);
        assert_eq!(s.column_names(), vec![OPEN, HIGH, LOW, CLOSE]);
        assert_eq!(s.bar(0), Some(bars[0]));
    }

    #[test]
    fn bar_requires_ohlc() {
        assert!(sample().bar(0).is_none());
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = sample();
        assert_eq!(a.fingerprint(), sample().fingerprint());
        let mut b = sample();
        b.set_column(CLOSE, vec![10.0, 11.0, 12.5]).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
