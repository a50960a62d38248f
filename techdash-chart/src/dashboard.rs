//! Dashboard session: every configured ticker loaded and annotated once,
//! then served as figures per (tab, ticker) selection.
//!
//! The session is immutable after `build`, so it can be shared across
//! threads behind a plain `Arc` without locking.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use techdash_core::data::{load_canonical, SeriesSource};
use techdash_core::domain::{PriceSeries, HIGH, LOW};
use techdash_core::{
    annotate_set, annotate_with, AnnotateError, AnnotatedSeries, IndicatorConfig, IndicatorSet,
};

use crate::assembly::assemble;
use crate::config::{ConfigError, DashboardConfig};
use crate::figure::{Figure, PanelKind};

/// Per-ticker overview of what the session holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerSummary {
    pub symbol: String,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub fingerprint: String,
    pub panels: Vec<PanelKind>,
}

/// A ticker left out of the session and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedTicker {
    pub symbol: String,
    pub reason: String,
}

pub struct Dashboard {
    config: DashboardConfig,
    series: BTreeMap<String, AnnotatedSeries>,
    skipped: Vec<SkippedTicker>,
}

impl Dashboard {
    /// Load and annotate every ticker of the universe.
    ///
    /// A ticker that fails to load or annotate is logged and skipped;
    /// selecting it later yields the placeholder figure.
    pub fn build(config: &DashboardConfig, source: &dyn SeriesSource) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut series = BTreeMap::new();
        let mut skipped = Vec::new();

        for ticker in config.universe.all_tickers() {
            let result = load_canonical(source, ticker)
                .map_err(|e| e.to_string())
                .and_then(|s| annotate_ticker(&s, &config.indicators).map_err(|e| e.to_string()));
            match result {
                Ok(annotated) => {
                    info!(
                        ticker,
                        rows = annotated.len(),
                        fingerprint = %annotated.series().fingerprint(),
                        "ticker ready"
                    );
                    series.insert(ticker.to_string(), annotated);
                }
                Err(reason) => {
                    warn!(ticker, source = source.name(), reason = %reason, "ticker skipped");
                    skipped.push(SkippedTicker {
                        symbol: ticker.to_string(),
                        reason,
                    });
                }
            }
        }

        info!(
            loaded = series.len(),
            skipped = skipped.len(),
            source = source.name(),
            "dashboard built"
        );

        Ok(Self {
            config: config.clone(),
            series,
            skipped,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Loaded tickers, sorted.
    pub fn tickers(&self) -> Vec<&str> {
        self.series.keys().map(|s| s.as_str()).collect()
    }

    pub fn series(&self, ticker: &str) -> Option<&AnnotatedSeries> {
        self.series.get(ticker)
    }

    pub fn skipped(&self) -> &[SkippedTicker] {
        &self.skipped
    }

    /// First ticker of the tab, as the tab's dropdown would preselect it.
    pub fn default_selection(&self, tab_id: &str) -> Option<&str> {
        self.config
            .universe
            .tab(tab_id)
            .and_then(|tab| tab.tickers.first())
            .map(|t| t.as_str())
    }

    /// The figure for a selection, or the tab's placeholder when the
    /// selection is empty, not part of the tab, or was not loaded.
    pub fn select(&self, tab_id: &str, ticker: Option<&str>) -> Figure {
        let Some(tab) = self.config.universe.tab(tab_id) else {
            warn!(tab = tab_id, "unknown tab");
            return self.placeholder("Select a valid Ticker to view the analysis.".into());
        };
        let noun_placeholder = || format!("Select a valid {} Ticker to view the analysis.", tab.noun());

        let Some(ticker) = ticker.filter(|t| tab.contains(t)) else {
            return self.placeholder(noun_placeholder());
        };
        let Some(series) = self.series.get(ticker) else {
            return self.placeholder(noun_placeholder());
        };

        match assemble(series, &self.config.chart, &self.config.style) {
            Ok(figure) => figure,
            Err(e) => {
                warn!(ticker, error = %e, "chart assembly failed");
                self.placeholder(noun_placeholder())
            }
        }
    }

    pub fn summary(&self) -> Vec<TickerSummary> {
        self.series
            .iter()
            .map(|(symbol, series)| {
                let panels = assemble(series, &self.config.chart, &self.config.style)
                    .map(|f| f.panel_kinds())
                    .unwrap_or_default();
                TickerSummary {
                    symbol: symbol.clone(),
                    rows: series.len(),
                    first_date: series.dates().first().copied(),
                    last_date: series.dates().last().copied(),
                    fingerprint: series.series().fingerprint(),
                    panels,
                }
            })
            .collect()
    }

    fn placeholder(&self, title: String) -> Figure {
        Figure::placeholder(title, &self.config.style, self.config.placeholder_height)
    }
}

/// Annotate with the standard set. A series without a high/low range still
/// gets the close-based indicators; only the stochastic panel goes missing.
fn annotate_ticker(
    series: &PriceSeries,
    config: &IndicatorConfig,
) -> Result<AnnotatedSeries, AnnotateError> {
    match annotate_with(series, config) {
        Err(AnnotateError::MissingColumn { column, indicator })
            if column == HIGH || column == LOW =>
        {
            warn!(
                ticker = series.symbol(),
                column = %column,
                indicator = %indicator,
                "no high/low range, stochastic skipped"
            );
            annotate_set(series, &IndicatorSet::close_only(config))
        }
        other => other,
    }
}
