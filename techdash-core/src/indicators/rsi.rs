//! Relative Strength Index (RSI).
//!
//! Cutler's variant: average gain and average loss are simple trailing means
//! of the per-period close changes (no Wilder smoothing).
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (one change is lost to the first difference).
//! Edge cases: avg_loss == 0 with gains → 100; no movement at all → NaN.

use super::rolling::{diff, rolling_mean};
use super::{input, Indicator};
use crate::annotate::{columns, AnnotateError};
use crate::domain::{PriceSeries, CLOSE};

/// RSI over an arbitrary value slice.
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let delta = diff(values);
    // f64::max would turn the leading NaN into 0.0 and shorten the warmup
    let clip = |d: f64| if d.is_nan() { f64::NAN } else { d.max(0.0) };
    let gain: Vec<f64> = delta.iter().map(|&d| clip(d)).collect();
    let loss: Vec<f64> = delta.iter().map(|&d| clip(-d)).collect();

    let avg_gain = rolling_mean(&gain, period);
    let avg_loss = rolling_mean(&loss, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| relative_strength_index(g, l))
        .collect()
}

fn relative_strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 && avg_gain == 0.0 {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        columns::RSI
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[CLOSE]
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<f64>, AnnotateError> {
        let close = input(series, CLOSE, columns::RSI)?;
        Ok(rsi(close, self.period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series};

    #[test]
    fn rsi_all_gains_saturates() {
        let result = rsi(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0], 3);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert!(result[3..].iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let result = rsi(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0], 3);
        assert_approx(result[3], 0.0, 1e-12);
        assert_approx(result[5], 0.0, 1e-12);
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // period=3 at index 3: gains 0.34, losses 0.73
        // RSI = 100 - 100 / (1 + 0.34/0.73)
        let result = rsi(&[44.0, 44.34, 44.09, 43.61, 44.33], 3);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);
        // index 4 window: -0.25, -0.48, +0.72
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4], expected, 1e-9);
    }

    #[test]
    fn rsi_flat_is_undefined() {
        let result = rsi(&[50.0; 8], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_bounds() {
        let series = make_series(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&series).unwrap();
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let result = rsi(&[100.0, 101.0, f64::NAN, 103.0, 104.0, 105.0, 106.0], 3);
        // changes at 2 and 3 are NaN; windows ending 2..=5 touch them
        assert!(result[..6].iter().all(|v| v.is_nan()));
        assert_eq!(result[6], 100.0);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
        assert_eq!(Rsi::new(14).name(), "RSI");
    }
}
