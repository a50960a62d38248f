//! The indicator engine: price table in, indicator-annotated table out.
//!
//! `annotate` never touches its input. It clones the table, computes every
//! indicator from the raw columns of the *input*, and sets the results as
//! columns of the copy. Re-annotating an annotated table therefore replaces
//! the indicator columns instead of stacking new ones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{PriceSeries, SeriesError};
use crate::indicators::{Bollinger, Indicator, Rsi, Sma, Stochastic};

/// Column names shared between the engine and chart assembly.
pub mod columns {
    pub const SMA_20: &str = "SMA_20";
    pub const SMA_50: &str = "SMA_50";
    pub const BB_UPPER: &str = "BB_Upper";
    pub const BB_LOWER: &str = "BB_Lower";
    pub const RSI: &str = "RSI";
    pub const STOCH_K: &str = "Stoch_%K";
    pub const STOCH_D: &str = "Stoch_%D";

    /// The standard indicator columns, in the order they are appended.
    pub const ALL: [&str; 7] = [SMA_20, SMA_50, BB_UPPER, BB_LOWER, RSI, STOCH_K, STOCH_D];
}

#[derive(Debug, Error, PartialEq)]
pub enum AnnotateError {
    #[error("missing column '{column}' required by {indicator}")]
    MissingColumn { column: String, indicator: String },

    #[error("dates not strictly ascending at row {index}: {previous} followed by {current}")]
    InvalidOrdering {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid indicator parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Indicator parameters. The defaults produce the standard column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub bollinger_window: usize,
    pub bollinger_num_std: f64,
    pub rsi_period: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast: 20,
            sma_slow: 50,
            bollinger_window: 20,
            bollinger_num_std: 2.0,
            rsi_period: 14,
            stoch_k_period: 14,
            stoch_d_period: 3,
        }
    }
}

impl IndicatorConfig {
    /// Column name of the fast moving average (`SMA_20` by default).
    pub fn sma_fast_column(&self) -> String {
        format!("SMA_{}", self.sma_fast)
    }

    pub fn sma_slow_column(&self) -> String {
        format!("SMA_{}", self.sma_slow)
    }

    pub fn validate(&self) -> Result<(), AnnotateError> {
        let windows = [
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("bollinger_window", self.bollinger_window),
            ("rsi_period", self.rsi_period),
            ("stoch_k_period", self.stoch_k_period),
            ("stoch_d_period", self.stoch_d_period),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(AnnotateError::InvalidParameter {
                    name,
                    reason: "must be at least 1".into(),
                });
            }
        }
        if self.sma_fast == self.sma_slow {
            return Err(AnnotateError::InvalidParameter {
                name: "sma_slow",
                reason: format!("duplicates sma_fast ({})", self.sma_fast),
            });
        }
        if self.bollinger_window < 2 {
            return Err(AnnotateError::InvalidParameter {
                name: "bollinger_window",
                reason: "sample deviation needs at least 2 observations".into(),
            });
        }
        if !self.bollinger_num_std.is_finite() || self.bollinger_num_std < 0.0 {
            return Err(AnnotateError::InvalidParameter {
                name: "bollinger_num_std",
                reason: format!("must be finite and >= 0, got {}", self.bollinger_num_std),
            });
        }
        Ok(())
    }
}

/// An ordered list of indicators to run.
#[derive(Default)]
pub struct IndicatorSet {
    indicators: Vec<Box<dyn Indicator>>,
}

impl IndicatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven dashboard indicators in column-contract order.
    pub fn standard(config: &IndicatorConfig) -> Self {
        Self::close_only(config)
            .with(Stochastic::k(config.stoch_k_period, config.stoch_d_period))
            .with(Stochastic::d(config.stoch_k_period, config.stoch_d_period))
    }

    /// Everything that can be computed from `close` alone (no stochastic).
    pub fn close_only(config: &IndicatorConfig) -> Self {
        Self::new()
            .with(Sma::new(config.sma_fast))
            .with(Sma::new(config.sma_slow))
            .with(Bollinger::upper(
                config.bollinger_window,
                config.bollinger_num_std,
            ))
            .with(Bollinger::lower(
                config.bollinger_window,
                config.bollinger_num_std,
            ))
            .with(Rsi::new(config.rsi_period))
    }

    pub fn with(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicators.push(Box::new(indicator));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Indicator> {
        self.indicators.iter().map(|i| i.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Maximum lookback across the set.
    pub fn warmup(&self) -> usize {
        self.iter().map(|i| i.lookback()).max().unwrap_or(0)
    }
}

impl std::fmt::Debug for IndicatorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A price table with indicator columns appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedSeries {
    series: PriceSeries,
    indicators: Vec<String>,
    warmup: usize,
}

impl AnnotatedSeries {
    /// The full table: raw columns followed by indicator columns.
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn into_series(self) -> PriceSeries {
        self.series
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        self.series.dates()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Names of the columns produced by the engine, in order.
    pub fn indicator_names(&self) -> &[String] {
        &self.indicators
    }

    /// Any column of the table, raw or derived.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.series.column(name)
    }

    /// Positions before this index are undefined for at least one indicator.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Count of defined (non-NaN) cells in a column; 0 if the column is absent.
    pub fn defined_count(&self, name: &str) -> usize {
        self.column(name)
            .map_or(0, |v| v.iter().filter(|x| !x.is_nan()).count())
    }

    /// True when the column is absent or has no defined cell.
    pub fn is_fully_undefined(&self, name: &str) -> bool {
        self.defined_count(name) == 0
    }
}

/// Annotate with the standard indicators and default parameters.
pub fn annotate(series: &PriceSeries) -> Result<AnnotatedSeries, AnnotateError> {
    annotate_set(series, &IndicatorSet::standard(&IndicatorConfig::default()))
}

/// Annotate with the standard indicators and custom parameters.
pub fn annotate_with(
    series: &PriceSeries,
    config: &IndicatorConfig,
) -> Result<AnnotatedSeries, AnnotateError> {
    config.validate()?;
    annotate_set(series, &IndicatorSet::standard(config))
}

/// Annotate with an explicit indicator set.
///
/// Fails before computing anything if the dates are not strictly ascending or
/// a required column is absent.
pub fn annotate_set(
    series: &PriceSeries,
    set: &IndicatorSet,
) -> Result<AnnotatedSeries, AnnotateError> {
    if let Some(index) = series.first_unordered() {
        let dates = series.dates();
        return Err(AnnotateError::InvalidOrdering {
            index,
            previous: dates[index - 1],
            current: dates[index],
        });
    }

    for indicator in set.iter() {
        for &column in indicator.required_columns() {
            if !series.has_column(column) {
                return Err(AnnotateError::MissingColumn {
                    column: column.to_string(),
                    indicator: indicator.name().to_string(),
                });
            }
        }
    }

    let mut annotated = series.clone();
    let mut names = Vec::with_capacity(set.len());
    for indicator in set.iter() {
        let values = indicator.compute(series)?;
        debug_assert_eq!(
            values.len(),
            series.len(),
            "indicator '{}' produced {} values for {} rows",
            indicator.name(),
            values.len(),
            series.len()
        );
        annotated.set_column(indicator.name(), values)?;
        names.push(indicator.name().to_string());
    }

    debug!(
        symbol = series.symbol(),
        rows = series.len(),
        indicators = names.len(),
        "annotated series"
    );

    Ok(AnnotatedSeries {
        series: annotated,
        indicators: names,
        warmup: set.warmup(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLOSE, HIGH, LOW, OPEN, VOLUME};
    use crate::indicators::make_series;

    fn ramp(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        make_series(&closes)
    }

    #[test]
    fn appends_seven_columns_after_raw() {
        let out = annotate(&ramp(60)).unwrap();
        let names = out.series().column_names();
        assert_eq!(&names[..5], &[OPEN, HIGH, LOW, CLOSE, VOLUME]);
        assert_eq!(&names[5..], &columns::ALL);
        assert_eq!(out.indicator_names(), &columns::ALL);
    }

    #[test]
    fn input_is_untouched() {
        let input = ramp(30);
        let before = input.fingerprint();
        let _ = annotate(&input).unwrap();
        assert_eq!(input.fingerprint(), before);
        assert_eq!(input.column_names().len(), 5);
    }

    #[test]
    fn reannotation_replaces_columns() {
        let once = annotate(&ramp(60)).unwrap();
        let twice = annotate(once.series()).unwrap();
        assert_eq!(
            once.series().column_names(),
            twice.series().column_names()
        );
        assert_eq!(once.series().fingerprint(), twice.series().fingerprint());
    }

    #[test]
    fn unordered_dates_fail() {
        let s = ramp(5).select_rows(&[0, 2, 1, 3, 4]);
        let err = annotate(&s).unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidOrdering { index: 2, .. }));
    }

    #[test]
    fn duplicate_date_fails() {
        let s = ramp(4).select_rows(&[0, 1, 1, 2]);
        assert!(matches!(
            annotate(&s),
            Err(AnnotateError::InvalidOrdering { index: 2, .. })
        ));
    }

    #[test]
    fn missing_close_fails_before_computing() {
        let s = PriceSeries::new("X", ramp(3).dates().to_vec());
        let err = annotate(&s).unwrap_err();
        assert_eq!(
            err,
            AnnotateError::MissingColumn {
                column: CLOSE.into(),
                indicator: "SMA_20".into()
            }
        );
    }

    #[test]
    fn close_only_set_skips_stochastic() {
        let base = ramp(30);
        let s = PriceSeries::new("X", base.dates().to_vec())
            .with_column(CLOSE, base.column(CLOSE).unwrap().to_vec())
            .unwrap();
        assert!(annotate(&s).is_err());
        let out = annotate_set(&s, &IndicatorSet::close_only(&IndicatorConfig::default())).unwrap();
        assert_eq!(out.indicator_names().len(), 5);
        assert!(out.column(columns::STOCH_K).is_none());
    }

    #[test]
    fn empty_series_annotates_to_empty_columns() {
        let out = annotate(&ramp(0)).unwrap();
        assert!(out.is_empty());
        for name in columns::ALL {
            assert_eq!(out.column(name).unwrap().len(), 0);
            assert!(out.is_fully_undefined(name));
        }
    }

    #[test]
    fn warmup_is_longest_lookback() {
        let out = annotate(&ramp(10)).unwrap();
        assert_eq!(out.warmup(), 49);
        assert_eq!(IndicatorSet::new().warmup(), 0);
    }

    #[test]
    fn config_validation() {
        assert!(IndicatorConfig::default().validate().is_ok());

        let zero = IndicatorConfig {
            rsi_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(AnnotateError::InvalidParameter { name: "rsi_period", .. })
        ));

        let same = IndicatorConfig {
            sma_slow: 20,
            ..Default::default()
        };
        assert!(same.validate().is_err());

        let negative = IndicatorConfig {
            bollinger_num_std: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn custom_windows_rename_sma_columns() {
        let config = IndicatorConfig {
            sma_fast: 5,
            sma_slow: 10,
            ..Default::default()
        };
        let out = annotate_with(&ramp(12), &config).unwrap();
        assert!(out.column("SMA_5").is_some());
        assert!(out.column("SMA_10").is_some());
        assert!(out.column(columns::SMA_20).is_none());
        assert_eq!(config.sma_fast_column(), "SMA_5");
    }

    #[test]
    fn annotate_with_rejects_invalid_config() {
        let config = IndicatorConfig {
            stoch_d_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            annotate_with(&ramp(12), &config),
            Err(AnnotateError::InvalidParameter { name: "stoch_d_period", .. })
        ));
    }
}
