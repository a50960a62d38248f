//! Dark dashboard style tokens.
//!
//! Every color and font the chart layer uses lives here and is handed to
//! assembly explicitly, so a `[style]` table in the config can override any
//! of them.
//!
//! # Color Palette
//! - **Background**: near-black paper, charcoal plot area
//! - **Price**: off-white close line
//! - **Averages**: cyan (fast) and blue (slow)
//! - **Oscillators**: violet RSI, yellow %K, orange %D
//! - **Zones**: dark gray shading with a lighter dashed reference line

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Paper background (outside the plot area)
    pub paper_background: String,
    /// Plot-area background
    pub plot_background: String,
    /// Primary text
    pub text: String,
    /// Y-axis grid lines
    pub grid: String,
    /// Overbought / oversold shading
    pub zone_fill: String,
    /// Dashed reference lines at zone edges
    pub zone_line: String,
    pub price: String,
    pub sma_fast: String,
    pub sma_slow: String,
    /// Bollinger band lines
    pub band_line: String,
    /// Fill between the Bollinger bands
    pub band_fill: String,
    pub rsi: String,
    pub stoch_k: String,
    pub stoch_d: String,
    pub font_family: String,
    pub font_size: u32,
    pub title_font_size: u32,
    /// Template name handed to the renderer for placeholder figures
    pub template: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::dark()
    }
}

impl StyleConfig {
    pub fn dark() -> Self {
        Self {
            paper_background: "#17191d".into(),
            plot_background: "#222426".into(),
            text: "#f3f4f6".into(),
            grid: "#4b5563".into(),
            zone_fill: "#2E3133".into(),
            zone_line: "#3F4345".into(),
            price: "#f3f4f6".into(),
            sma_fast: "#15d8fa".into(),
            sma_slow: "#168bf9".into(),
            band_line: "#4b5563".into(),
            band_fill: "rgba(75, 85, 99, 0.3)".into(),
            rsi: "#a78bfa".into(),
            stoch_k: "#facc15".into(),
            stoch_d: "#f97316".into(),
            font_family: "Tahoma, sans-serif".into(),
            font_size: 12,
            title_font_size: 18,
            template: "plotly_dark".into(),
        }
    }

    /// Every color must be `#rrggbb`, `rgb(...)` or `rgba(...)`; font sizes non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let colors = [
            ("paper_background", &self.paper_background),
            ("plot_background", &self.plot_background),
            ("text", &self.text),
            ("grid", &self.grid),
            ("zone_fill", &self.zone_fill),
            ("zone_line", &self.zone_line),
            ("price", &self.price),
            ("sma_fast", &self.sma_fast),
            ("sma_slow", &self.sma_slow),
            ("band_line", &self.band_line),
            ("band_fill", &self.band_fill),
            ("rsi", &self.rsi),
            ("stoch_k", &self.stoch_k),
            ("stoch_d", &self.stoch_d),
        ];
        for (field, value) in colors {
            if !is_color(value) {
                return Err(ConfigError::Invalid(format!(
                    "style.{field}: '{value}' is not a color"
                )));
            }
        }
        if self.font_size == 0 || self.title_font_size == 0 {
            return Err(ConfigError::Invalid("style font sizes must be > 0".into()));
        }
        Ok(())
    }
}

fn is_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    (value.starts_with("rgb(") || value.starts_with("rgba(")) && value.ends_with(')')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_palette() {
        let style = StyleConfig::default();
        assert_eq!(style.paper_background, "#17191d");
        assert_eq!(style.plot_background, "#222426");
        assert_eq!(style.band_fill, "rgba(75, 85, 99, 0.3)");
        assert!(style.validate().is_ok());
    }

    #[test]
    fn color_check() {
        assert!(is_color("#a78bfa"));
        assert!(is_color("rgb(1, 2, 3)"));
        assert!(!is_color("#abc"));
        assert!(!is_color("violet"));
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let style: StyleConfig = toml::from_str("rsi = \"#ff0000\"\nfont_size = 14").unwrap();
        assert_eq!(style.rsi, "#ff0000");
        assert_eq!(style.font_size, 14);
        assert_eq!(style.stoch_k, "#facc15");
    }

    #[test]
    fn rejects_bad_color() {
        let style = StyleConfig {
            grid: "grey".into(),
            ..StyleConfig::default()
        };
        let err = style.validate().unwrap_err();
        assert!(err.to_string().contains("style.grid"));
    }
}
