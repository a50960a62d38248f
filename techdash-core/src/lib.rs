//! TechDash Core: price tables, the indicator engine, data sources and export.
//!
//! This crate contains everything below the chart layer:
//! - Domain types (price bars and the date-indexed price table)
//! - Rolling-window kernels and the indicator trait with its implementations
//! - `annotate`, which appends SMA, Bollinger, RSI and stochastic columns
//! - Series sources (CSV directory, Parquet directory, synthetic) with
//!   canonicalization, plus CSV/Parquet export of annotated tables

pub mod annotate;
pub mod data;
pub mod domain;
pub mod indicators;

pub use annotate::{
    annotate, annotate_set, annotate_with, columns, AnnotateError, AnnotatedSeries,
    IndicatorConfig, IndicatorSet,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types shared with the dashboard are Send + Sync.
    ///
    /// The dashboard holds annotated series for the whole session and serves
    /// selections from any thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceBar>();
        require_sync::<domain::PriceBar>();
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<AnnotatedSeries>();
        require_sync::<AnnotatedSeries>();
        require_send::<IndicatorConfig>();
        require_sync::<IndicatorConfig>();
        require_send::<IndicatorSet>();
        require_sync::<IndicatorSet>();

        require_send::<data::CsvDirectory>();
        require_sync::<data::CsvDirectory>();
        require_send::<data::ParquetDirectory>();
        require_sync::<data::ParquetDirectory>();
        require_send::<data::SyntheticSource>();
        require_sync::<data::SyntheticSource>();
        require_send::<data::Universe>();
        require_sync::<data::Universe>();
    }

    /// Compile-time check: indicators are usable as trait objects and only
    /// see the price table.
    #[allow(dead_code)]
    fn assert_indicator_object_safe(
        indicator: &dyn indicators::Indicator,
        series: &domain::PriceSeries,
    ) -> Result<Vec<f64>, AnnotateError> {
        indicator.compute(series)
    }
}
