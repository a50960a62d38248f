//! Chart assembly: annotated table in, three-panel figure out.
//!
//! Panels, top to bottom:
//! - Price: Bollinger bands (filled), slow and fast SMA, close
//! - RSI with 70/30 zones
//! - Stochastic %K/%D with 80/20 zones
//!
//! A panel with nothing defined to show is left out rather than failing the
//! figure. Every trace carries the full history; only the initial visible
//! window is limited to the last `last_n` dates.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use techdash_core::columns;
use techdash_core::domain::CLOSE;
use techdash_core::AnnotatedSeries;

use crate::figure::{
    Figure, FigureMeta, Fill, Font, LineDash, Layout, Margin, Panel, PanelKind, ReferenceBand,
    ReferenceLine, Trace, XAxis, XRange, YAxis,
};
use crate::style::StyleConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("last_n must be at least 1")]
    InvalidWindow,

    #[error("invalid chart option: {0}")]
    InvalidOption(String),
}

/// Figure-level options independent of styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Number of trailing dates visible initially.
    pub last_n: usize,
    pub height: u32,
    /// Relative heights of the price, RSI and stochastic rows.
    pub row_weights: [f64; 3],
    pub vertical_spacing: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            last_n: 90,
            height: 1000,
            row_weights: [0.6, 0.2, 0.2],
            vertical_spacing: 0.02,
        }
    }
}

impl ChartOptions {
    pub fn with_last_n(mut self, last_n: usize) -> Self {
        self.last_n = last_n;
        self
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if self.last_n == 0 {
            return Err(ChartError::InvalidWindow);
        }
        if self.height == 0 {
            return Err(ChartError::InvalidOption("height must be > 0".into()));
        }
        if self.row_weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(ChartError::InvalidOption(format!(
                "row weights must be finite and positive, got {:?}",
                self.row_weights
            )));
        }
        if !(0.0..0.5).contains(&self.vertical_spacing) {
            return Err(ChartError::InvalidOption(format!(
                "vertical spacing must be in [0, 0.5), got {}",
                self.vertical_spacing
            )));
        }
        Ok(())
    }
}

/// Build the figure for one annotated table.
pub fn assemble(
    series: &AnnotatedSeries,
    options: &ChartOptions,
    style: &StyleConfig,
) -> Result<Figure, ChartError> {
    options.validate()?;

    let mut staged: Vec<(PanelKind, Vec<Trace>, Vec<ReferenceBand>, Vec<ReferenceLine>)> =
        Vec::with_capacity(3);

    for kind in PanelKind::ALL {
        let built = match kind {
            PanelKind::Price => price_traces(series, style).map(|t| (t, vec![], vec![])),
            PanelKind::Rsi => rsi_traces(series, style).map(|t| {
                let (bands, lines) = zones(70.0, 30.0, style);
                (t, bands, lines)
            }),
            PanelKind::Stochastic => stochastic_traces(series, style).map(|t| {
                let (bands, lines) = zones(80.0, 20.0, style);
                (t, bands, lines)
            }),
        };
        match built {
            Some((traces, bands, lines)) => staged.push((kind, traces, bands, lines)),
            None => debug!(symbol = series.symbol(), panel = %kind, "panel omitted: nothing defined"),
        }
    }

    let weight_total: f64 = staged
        .iter()
        .map(|(kind, ..)| options.row_weights[row_index(*kind)])
        .sum();
    let x_range = visible_range(series, options.last_n);
    let last_row = staged.len();

    let panels = staged
        .into_iter()
        .enumerate()
        .map(|(i, (kind, traces, bands, lines))| Panel {
            kind,
            row: i + 1,
            height_share: options.row_weights[row_index(kind)] / weight_total,
            x_axis: XAxis {
                range: x_range,
                matches: "x".into(),
                show_grid: false,
                show_tick_labels: i + 1 == last_row,
                range_slider: false,
            },
            y_axis: YAxis {
                title: kind.y_title().into(),
                range: match kind {
                    PanelKind::Price => None,
                    PanelKind::Rsi | PanelKind::Stochastic => Some([0.0, 100.0]),
                },
                grid_color: style.grid.clone(),
                mirror: true,
            },
            traces,
            bands,
            lines,
        })
        .collect();

    let dates = series.dates();
    Ok(Figure {
        layout: Layout {
            title: Some(series.symbol().to_string()),
            height: options.height,
            show_legend: false,
            margin: Margin::default(),
            title_font_size: style.title_font_size,
            font: Font::from_style(style),
            plot_background: Some(style.plot_background.clone()),
            paper_background: Some(style.paper_background.clone()),
            hover_mode: Some("x unified".into()),
            vertical_spacing: options.vertical_spacing,
            template: None,
        },
        panels,
        meta: Some(FigureMeta {
            symbol: series.symbol().to_string(),
            rows: series.len(),
            first_date: dates.first().copied(),
            last_date: dates.last().copied(),
            fingerprint: series.series().fingerprint(),
        }),
    })
}

fn row_index(kind: PanelKind) -> usize {
    match kind {
        PanelKind::Price => 0,
        PanelKind::Rsi => 1,
        PanelKind::Stochastic => 2,
    }
}

/// The last `last_n` dates, when there are more than that.
fn visible_range(series: &AnnotatedSeries, last_n: usize) -> Option<XRange> {
    let dates = series.dates();
    if dates.len() <= last_n {
        return None;
    }
    Some(XRange {
        start: dates[dates.len() - last_n],
        end: dates[dates.len() - 1],
    })
}

/// A trace for `column` if it has at least one defined cell.
fn defined_trace(
    series: &AnnotatedSeries,
    column: &str,
    label: &str,
    color: &str,
    width: f64,
) -> Option<Trace> {
    if series.is_fully_undefined(column) {
        return None;
    }
    let values = series.column(column)?;
    Some(Trace::line(label, series.dates(), values, color, width))
}

/// SMA columns produced by the engine, fast window first.
fn sma_columns(series: &AnnotatedSeries) -> Vec<(usize, &str)> {
    let mut smas: Vec<(usize, &str)> = series
        .indicator_names()
        .iter()
        .filter_map(|name| {
            let window = name.strip_prefix("SMA_")?.parse().ok()?;
            Some((window, name.as_str()))
        })
        .collect();
    smas.sort_by_key(|(window, _)| *window);
    smas
}

fn price_traces(series: &AnnotatedSeries, style: &StyleConfig) -> Option<Vec<Trace>> {
    let close = defined_trace(series, CLOSE, "Close Price", &style.price, 2.0)?;
    let mut traces = Vec::with_capacity(5);

    let upper = defined_trace(series, columns::BB_UPPER, "BB Upper", &style.band_line, 1.0);
    let lower = defined_trace(series, columns::BB_LOWER, "BB Lower", &style.band_line, 1.0);
    if let (Some(upper), Some(lower)) = (upper, lower) {
        traces.push(upper.without_legend());
        traces.push(lower.with_fill(Fill::ToNextY {
            color: style.band_fill.clone(),
        }));
    }

    // Slow average drawn first so the fast one sits on top.
    let smas = sma_columns(series);
    let colors = [&style.sma_fast, &style.sma_slow];
    for (i, (window, column)) in smas.iter().enumerate().take(2).rev() {
        let label = format!("MA{window}");
        if let Some(trace) = defined_trace(series, column, &label, colors[i], 1.5) {
            traces.push(trace.with_opacity(0.9));
        }
    }

    traces.push(close);
    Some(traces)
}

fn rsi_traces(series: &AnnotatedSeries, style: &StyleConfig) -> Option<Vec<Trace>> {
    defined_trace(series, columns::RSI, "RSI", &style.rsi, 2.0).map(|t| vec![t])
}

fn stochastic_traces(series: &AnnotatedSeries, style: &StyleConfig) -> Option<Vec<Trace>> {
    let traces: Vec<Trace> = [
        defined_trace(series, columns::STOCH_K, "%K", &style.stoch_k, 2.0),
        defined_trace(series, columns::STOCH_D, "%D", &style.stoch_d, 1.5),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!traces.is_empty()).then_some(traces)
}

/// Shaded overbought/oversold regions plus dashed lines at their edges.
fn zones(upper: f64, lower: f64, style: &StyleConfig) -> (Vec<ReferenceBand>, Vec<ReferenceLine>) {
    let bands = vec![
        ReferenceBand {
            y0: upper,
            y1: 100.0,
            color: style.zone_fill.clone(),
        },
        ReferenceBand {
            y0: 0.0,
            y1: lower,
            color: style.zone_fill.clone(),
        },
    ];
    let lines = [upper, lower]
        .into_iter()
        .map(|y| ReferenceLine {
            y,
            color: style.zone_line.clone(),
            dash: LineDash::Dash,
        })
        .collect();
    (bands, lines)
}
