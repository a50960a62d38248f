//! TechDash chart layer: rendering specs for the indicator dashboard.
//!
//! Provides:
//! - Three-panel figure assembly (price with bands and averages, RSI, stochastic)
//! - Dark style tokens, overridable from config
//! - The dashboard session (tabs of tickers, selection to figure)
//! - TOML configuration for all of the above

pub mod assembly;
pub mod config;
pub mod dashboard;
pub mod figure;
pub mod style;

pub use assembly::{assemble, ChartError, ChartOptions};
pub use config::{ConfigError, DashboardConfig, DataConfig};
pub use dashboard::{Dashboard, SkippedTicker, TickerSummary};
pub use figure::{Figure, Panel, PanelKind, Trace};
pub use style::StyleConfig;
