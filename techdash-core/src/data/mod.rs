//! Data loading boundary: sources, canonicalization, export and the ticker universe.

pub mod canonicalize;
pub mod csv_source;
pub mod export;
pub mod parquet_source;
pub mod provider;
pub mod synthetic;
pub mod universe;

pub use canonicalize::{AnomalyReport, AnomalyType, Canonicalized, Canonicalizer, Severity};
pub use csv_source::{parse_date, read_csv, CsvDirectory};
pub use export::{to_csv_string, to_dataframe, write_csv, write_parquet};
pub use parquet_source::{read_parquet, ParquetDirectory};
pub use provider::{load_canonical, DataError, SeriesSource, SourceKind};
pub use synthetic::{synthetic_bars, SyntheticSource};
pub use universe::{Tab, Universe, UniverseError};
