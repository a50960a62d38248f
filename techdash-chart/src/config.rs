//! Dashboard configuration, stored as TOML.
//!
//! Every section is optional and falls back to the built-in defaults:
//!
//! ```toml
//! title = "Technical Indicators Dashboard"
//!
//! [data]
//! dir = "data"
//! format = "csv"        # csv | parquet | synthetic
//!
//! [[universe.tabs]]
//! id = "stocks"
//! label = "Stocks"
//! tickers = ["AAPL", "MSFT", "NVDA"]
//!
//! [indicators]
//! rsi_period = 14
//!
//! [chart]
//! last_n = 90
//!
//! [style]
//! rsi = "#a78bfa"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use techdash_core::data::{CsvDirectory, ParquetDirectory, SeriesSource, SourceKind, SyntheticSource, Universe};
use techdash_core::IndicatorConfig;

use crate::assembly::ChartOptions;
use crate::style::StyleConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where ticker tables come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub format: SourceKind,
    /// Last date generated by the synthetic source.
    pub synthetic_end: NaiveDate,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            format: SourceKind::Csv,
            synthetic_end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }
}

impl DataConfig {
    /// Open the configured source. The synthetic source serves `symbols`.
    pub fn open(&self, symbols: &[&str]) -> Box<dyn SeriesSource> {
        match self.format {
            SourceKind::Csv => Box::new(CsvDirectory::new(&self.dir)),
            SourceKind::Parquet => Box::new(ParquetDirectory::new(&self.dir)),
            SourceKind::Synthetic => Box::new(SyntheticSource::trailing_year(
                symbols.iter().map(|s| s.to_string()).collect(),
                self.synthetic_end,
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub data: DataConfig,
    pub universe: Universe,
    pub indicators: IndicatorConfig,
    pub chart: ChartOptions,
    pub style: StyleConfig,
    /// Height of the placeholder shown for an invalid selection.
    pub placeholder_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Technical Indicators Dashboard".into(),
            data: DataConfig::default(),
            universe: Universe::default_dashboard(),
            indicators: IndicatorConfig::default(),
            chart: ChartOptions::default(),
            style: StyleConfig::default(),
            placeholder_height: 900,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.universe
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.indicators
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.chart
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.style.validate()?;
        if self.placeholder_height == 0 {
            return Err(ConfigError::Invalid("placeholder_height must be > 0".into()));
        }
        Ok(())
    }
}
