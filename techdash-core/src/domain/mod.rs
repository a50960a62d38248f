//! Domain types: price bars and the date-indexed price table.

pub mod bar;
pub mod series;

pub use bar::PriceBar;
pub use series::{NamedColumn, PriceSeries, SeriesError, CLOSE, HIGH, LOW, OPEN, RAW_COLUMNS, VOLUME};
