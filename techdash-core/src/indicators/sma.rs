//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::rolling::rolling_mean;
use super::{input, Indicator};
use crate::annotate::AnnotateError;
use crate::domain::{PriceSeries, CLOSE};

/// SMA over an arbitrary value slice.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(values, period)
}

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("SMA_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[CLOSE]
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<f64>, AnnotateError> {
        let close = input(series, CLOSE, &self.name)?;
        Ok(sma(close, self.period))
    }
}
