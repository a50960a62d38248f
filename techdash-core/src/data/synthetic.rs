//! Synthetic data source for demos and tests.
//!
//! Produces a random walk from 100.0 per symbol, seeded from the symbol name
//! so every run sees the same bars. Weekends are skipped.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, SeriesSource};
use crate::domain::{PriceBar, PriceSeries};

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    symbols: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

impl SyntheticSource {
    pub fn new(symbols: Vec<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbols,
            start,
            end,
        }
    }

    /// One trading year ending at `end`.
    pub fn trailing_year(symbols: Vec<String>, end: NaiveDate) -> Self {
        Self::new(symbols, end - Duration::days(365), end)
    }
}

impl SeriesSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn symbols(&self) -> Result<Vec<String>, DataError> {
        let mut symbols = self.symbols.clone();
        symbols.sort();
        Ok(symbols)
    }

    fn load(&self, symbol: &str) -> Result<PriceSeries, DataError> {
        if !self.symbols.iter().any(|s| s == symbol) {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
                source_name: self.name().to_string(),
            });
        }
        let bars = synthetic_bars(symbol, self.start, self.end);
        Ok(PriceSeries::from_bars(symbol, &bars))
    }
}

/// Random-walk bars between `start` and `end` inclusive, weekdays only.
pub fn synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(PriceBar {
            date: current,
            open,
            high,
            low,
            close,
            volume: Some(volume),
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bars_are_deterministic_per_symbol() {
        let a = synthetic_bars("AAPL", d(2024, 1, 1), d(2024, 3, 1));
        let b = synthetic_bars("AAPL", d(2024, 1, 1), d(2024, 3, 1));
        let c = synthetic_bars("MSFT", d(2024, 1, 1), d(2024, 3, 1));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn skips_weekends_and_stays_sane() {
        // 2024-01-06 and 07 are a weekend.
        let bars = synthetic_bars("GLD", d(2024, 1, 1), d(2024, 1, 12));
        assert_eq!(bars.len(), 10);
        for bar in &bars {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.is_sane(), "{bar:?}");
        }
    }

    #[test]
    fn source_serves_only_configured_symbols() {
        let source = SyntheticSource::trailing_year(
            vec!["SLV".into(), "GLD".into()],
            d(2024, 6, 28),
        );
        assert_eq!(source.symbols().unwrap(), vec!["GLD", "SLV"]);

        let series = source.load("SLV").unwrap();
        assert!(series.len() > 250);
        assert!(series.first_unordered().is_none());

        let err = source.load("AAPL").unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }
}
