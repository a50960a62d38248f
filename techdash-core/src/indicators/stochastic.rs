//! Stochastic Oscillator (%K / %D).
//!
//! %K = 100 * (close - lowest_low) / (highest_high - lowest_low) over k_period.
//! %D = simple mean of %K over d_period.
//! A zero high-low range makes %K undefined, and %D with it.

use super::rolling::{rolling_max, rolling_mean, rolling_min};
use super::{input, Indicator};
use crate::annotate::{columns, AnnotateError};
use crate::domain::{PriceSeries, CLOSE, HIGH, LOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

/// Both lines over raw slices: `(%K, %D)`.
pub fn stochastic(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    k_period: usize,
    d_period: usize,
) -> (Vec<f64>, Vec<f64>) {
    let high_max = rolling_max(high, k_period);
    let low_min = rolling_min(low, k_period);

    let k: Vec<f64> = close
        .iter()
        .zip(high_max.iter().zip(&low_min))
        .map(|(&c, (&hi, &lo))| {
            let range = hi - lo;
            if range == 0.0 || range.is_nan() {
                f64::NAN
            } else {
                // ratio first: keeps the result inside [0, 100] when lo <= c <= hi
                100.0 * ((c - lo) / range)
            }
        })
        .collect();
    let d = rolling_mean(&k, d_period);
    (k, d)
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    line: StochasticLine,
}

impl Stochastic {
    pub fn k(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period,
            d_period,
            line: StochasticLine::K,
        }
    }

    pub fn d(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period,
            d_period,
            line: StochasticLine::D,
        }
    }

    pub fn line(&self) -> StochasticLine {
        self.line
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        match self.line {
            StochasticLine::K => columns::STOCH_K,
            StochasticLine::D => columns::STOCH_D,
        }
    }

    fn lookback(&self) -> usize {
        let k = self.k_period.saturating_sub(1);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.d_period.saturating_sub(1),
        }
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[HIGH, LOW, CLOSE]
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<f64>, AnnotateError> {
        let high = input(series, HIGH, self.name())?;
        let low = input(series, LOW, self.name())?;
        let close = input(series, CLOSE, self.name())?;
        let (k, d) = stochastic(high, low, close, self.k_period, self.d_period);
        Ok(match self.line {
            StochasticLine::K => k,
            StochasticLine::D => d,
        })
    }
}
