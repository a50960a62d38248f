//! Indicator trait and the concrete indicators of the dashboard.
//!
//! Indicators are pure functions: a price table in, one numeric series of the
//! same length out. The first `lookback()` positions are NaN (warmup).
//!
//! Multi-output indicators (Bollinger, Stochastic) are exposed as separate
//! named instances per output line, keeping the single-series trait unchanged.

pub mod bollinger;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use bollinger::{bollinger_bands, Bollinger, BollingerBand};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};
pub use stochastic::{stochastic, Stochastic, StochasticLine};

use crate::annotate::AnnotateError;
use crate::domain::PriceSeries;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at position t may depend on data from position t+1 or later.
/// Every indicator must give the same prefix on a truncated series.
pub trait Indicator: Send + Sync {
    /// Output column name (e.g. "SMA_20", "Stoch_%K").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Raw columns the indicator reads.
    fn required_columns(&self) -> &'static [&'static str];

    /// Compute the indicator over the whole table.
    ///
    /// Returns a `Vec<f64>` of the same length as the table.
    fn compute(&self, series: &PriceSeries) -> Result<Vec<f64>, AnnotateError>;
}

/// Fetch a column an indicator depends on.
pub(crate) fn input<'a>(
    series: &'a PriceSeries,
    column: &str,
    indicator: &str,
) -> Result<&'a [f64], AnnotateError> {
    series
        .column(column)
        .ok_or_else(|| AnnotateError::MissingColumn {
            column: column.to_string(),
            indicator: indicator.to_string(),
        })
}

/// Build a table from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for the first row),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    use crate::domain::PriceBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars: Vec<PriceBar> = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: Some(1000.0),
            }
        })
        .collect();
    PriceSeries::from_bars("TEST", &bars)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
