//! The rendering spec: a serializable description of a stacked multi-panel
//! chart. A UI shell turns it into pixels; nothing here draws anything.
//!
//! Undefined indicator cells are `None` and serialize as JSON `null`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::style::StyleConfig;

/// One complete figure: layout plus panels top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub layout: Layout,
    pub panels: Vec<Panel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<FigureMeta>,
}

/// Which dataset a figure was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureMeta {
    pub symbol: String,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// BLAKE3 digest of the annotated table.
    pub fingerprint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Price,
    Rsi,
    Stochastic,
}

impl PanelKind {
    pub const ALL: [PanelKind; 3] = [PanelKind::Price, PanelKind::Rsi, PanelKind::Stochastic];

    pub fn y_title(self) -> &'static str {
        match self {
            PanelKind::Price => "Price",
            PanelKind::Rsi => "RSI",
            PanelKind::Stochastic => "Stochastics",
        }
    }
}

impl std::fmt::Display for PanelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PanelKind::Price => "price",
            PanelKind::Rsi => "rsi",
            PanelKind::Stochastic => "stochastic",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub kind: PanelKind,
    /// 1-based row in the stacked layout.
    pub row: usize,
    /// Share of the figure height, normalized over the panels present.
    pub height_share: f64,
    pub x_axis: XAxis,
    pub y_axis: YAxis,
    pub traces: Vec<Trace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<ReferenceBand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<ReferenceLine>,
}

impl Panel {
    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XAxis {
    /// Initial visible window; `None` shows everything.
    pub range: Option<XRange>,
    /// Axis id this one is linked to (all panels pan and zoom together).
    pub matches: String,
    pub show_grid: bool,
    pub show_tick_labels: bool,
    pub range_slider: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YAxis {
    pub title: String,
    pub range: Option<[f64; 2]>,
    pub grid_color: String,
    pub mirror: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
    pub line: LineStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    pub show_legend: bool,
}

impl Trace {
    pub fn line(name: &str, x: &[NaiveDate], values: &[f64], color: &str, width: f64) -> Self {
        Self {
            name: name.to_string(),
            x: x.to_vec(),
            y: values.iter().map(|v| if v.is_nan() { None } else { Some(*v) }).collect(),
            line: LineStyle {
                color: color.to_string(),
                width,
                dash: LineDash::Solid,
            },
            opacity: None,
            fill: None,
            show_legend: true,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn without_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn defined_count(&self) -> usize {
        self.y.iter().filter(|v| v.is_some()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub dash: LineDash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

/// Area fill between this trace and another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Fill {
    /// Fill down to the previous trace in the panel.
    ToNextY { color: String },
}

/// Horizontal shaded region drawn beneath the traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBand {
    pub y0: f64,
    pub y1: f64,
    pub color: String,
}

/// Horizontal reference line across the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub color: String,
    pub dash: LineDash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Option<String>,
    pub height: u32,
    pub show_legend: bool,
    pub margin: Margin,
    pub title_font_size: u32,
    pub font: Font,
    pub plot_background: Option<String>,
    pub paper_background: Option<String>,
    pub hover_mode: Option<String>,
    pub vertical_spacing: f64,
    pub template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
    pub l: u32,
    pub r: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            t: 80,
            b: 50,
            l: 50,
            r: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
    pub color: String,
}

impl Font {
    pub fn from_style(style: &StyleConfig) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size,
            color: style.text.clone(),
        }
    }
}

impl Figure {
    /// An empty titled figure shown in place of an invalid selection.
    pub fn placeholder(title: impl Into<String>, style: &StyleConfig, height: u32) -> Self {
        Self {
            layout: Layout {
                title: Some(title.into()),
                height,
                show_legend: false,
                margin: Margin::default(),
                title_font_size: style.title_font_size,
                font: Font::from_style(style),
                plot_background: None,
                paper_background: None,
                hover_mode: None,
                vertical_spacing: 0.0,
                template: Some(style.template.clone()),
            },
            panels: Vec::new(),
            meta: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panel(&self, kind: PanelKind) -> Option<&Panel> {
        self.panels.iter().find(|p| p.kind == kind)
    }

    pub fn panel_kinds(&self) -> Vec<PanelKind> {
        self.panels.iter().map(|p| p.kind).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
