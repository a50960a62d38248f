//! Universe configuration: tabs of tickers.
//!
//! The universe is stored as TOML, one `[[tabs]]` table per dashboard tab.
//! Tab order is display order; the first ticker of a tab is its default
//! selection.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("duplicate tab id '{0}'")]
    DuplicateTab(String),

    #[error("tab '{0}' has no tickers")]
    EmptyTab(String),
}

/// One dashboard tab (e.g. Stocks, Precious Metals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub label: String,
    /// Noun used in the "Select a valid ... Ticker" placeholder. Defaults to
    /// a singular form of the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_noun: Option<String>,
    pub tickers: Vec<String>,
}

impl Tab {
    pub fn new(id: &str, label: &str, tickers: &[&str]) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            placeholder_noun: None,
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn with_placeholder_noun(mut self, noun: &str) -> Self {
        self.placeholder_noun = Some(noun.into());
        self
    }

    pub fn noun(&self) -> &str {
        match &self.placeholder_noun {
            Some(noun) => noun,
            None => self.label.strip_suffix('s').unwrap_or(&self.label),
        }
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }
}

/// The complete universe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    pub tabs: Vec<Tab>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::default_dashboard()
    }
}

impl Universe {
    /// Stocks and precious-metal ETFs.
    pub fn default_dashboard() -> Self {
        Self {
            tabs: vec![
                Tab::new("stocks", "Stocks", &["AAPL", "MSFT", "NVDA"]).with_placeholder_noun("Stock"),
                Tab::new("metals", "Precious Metals", &["GLD", "SLV"])
                    .with_placeholder_noun("Precious Metals"),
            ],
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let universe: Self = toml::from_str(content)?;
        universe.validate()?;
        Ok(universe)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tab ids must be unique and every tab needs a ticker.
    pub fn validate(&self) -> Result<(), UniverseError> {
        let mut ids = HashSet::new();
        for tab in &self.tabs {
            if !ids.insert(tab.id.as_str()) {
                return Err(UniverseError::DuplicateTab(tab.id.clone()));
            }
            if tab.tickers.is_empty() {
                return Err(UniverseError::EmptyTab(tab.id.clone()));
            }
        }
        Ok(())
    }

    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Every ticker once, in tab order.
    pub fn all_tickers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.tabs
            .iter()
            .flat_map(|tab| tab.tickers.iter().map(|t| t.as_str()))
            .filter(|t| seen.insert(*t))
            .collect()
    }

    pub fn tab_ids(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.id.as_str()).collect()
    }
}
