//! Bollinger Bands — moving average +/- a multiple of the trailing deviation.
//!
//! Two bands (separate Indicator instances):
//! - Upper: SMA(close, period) + k * stddev(close, period)
//! - Lower: SMA(close, period) - k * stddev(close, period)
//!
//! Uses the sample standard deviation (divide by N-1).
//! Lookback: period - 1.

use super::rolling::{rolling_mean, rolling_std};
use super::{input, Indicator};
use crate::annotate::{columns, AnnotateError};
use crate::domain::{PriceSeries, CLOSE};

/// Which band of the Bollinger envelope to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Lower,
}

/// Both bands over an arbitrary value slice: `(upper, lower)`.
pub fn bollinger_bands(values: &[f64], period: usize, num_std: f64) -> (Vec<f64>, Vec<f64>) {
    let mean = rolling_mean(values, period);
    let std = rolling_std(values, period);
    mean.iter()
        .zip(&std)
        .map(|(m, s)| (m + num_std * s, m - num_std * s))
        .unzip()
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    num_std: f64,
    band: BollingerBand,
}

impl Bollinger {
    pub fn upper(period: usize, num_std: f64) -> Self {
        Self {
            period,
            num_std,
            band: BollingerBand::Upper,
        }
    }

    pub fn lower(period: usize, num_std: f64) -> Self {
        Self {
            period,
            num_std,
            band: BollingerBand::Lower,
        }
    }

    pub fn band(&self) -> BollingerBand {
        self.band
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        match self.band {
            BollingerBand::Upper => columns::BB_UPPER,
            BollingerBand::Lower => columns::BB_LOWER,
        }
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &[CLOSE]
    }

    fn compute(&self, series: &PriceSeries) -> Result<Vec<f64>, AnnotateError> {
        let close = input(series, CLOSE, self.name())?;
        let (upper, lower) = bollinger_bands(close, self.period, self.num_std);
        Ok(match self.band {
            BollingerBand::Upper => upper,
            BollingerBand::Lower => lower,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::rolling::rolling_std;
    use crate::indicators::{assert_approx, make_series, sma, DEFAULT_EPSILON};

    #[test]
    fn bands_straddle_sma() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
        let (upper, lower) = bollinger_bands(&closes, 3, 2.0);
        let mid = sma(&closes, 3);

        assert!(upper[0].is_nan() && upper[1].is_nan());
        assert!(lower[0].is_nan() && lower[1].is_nan());
        for i in 2..5 {
            assert_approx(upper[i] - mid[i], mid[i] - lower[i], DEFAULT_EPSILON);
            // sample stddev of three consecutive integers is 1
            assert_approx(upper[i] - mid[i], 2.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn band_width_is_two_k_std() {
        let closes = [44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4];
        let k = 2.5;
        let (upper, lower) = bollinger_bands(&closes, 4, k);
        let std = rolling_std(&closes, 4);
        for i in 3..closes.len() {
            assert_approx(upper[i] - lower[i], 2.0 * k * std[i], 1e-9);
        }
    }

    #[test]
    fn constant_price_zero_width() {
        let series = make_series(&[100.0; 4]);
        let upper = Bollinger::upper(3, 2.0).compute(&series).unwrap();
        let lower = Bollinger::lower(3, 2.0).compute(&series).unwrap();
        assert_eq!(upper[2], 100.0);
        assert_eq!(lower[2], 100.0);
    }

    #[test]
    fn nan_propagation() {
        let (upper, _) = bollinger_bands(&[10.0, 11.0, f64::NAN, 13.0], 3, 2.0);
        assert!(upper[2].is_nan());
        assert!(upper[3].is_nan());
    }

    #[test]
    fn names_follow_column_contract() {
        assert_eq!(Bollinger::upper(20, 2.0).name(), "BB_Upper");
        assert_eq!(Bollinger::lower(20, 2.0).name(), "BB_Lower");
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
    }
}
