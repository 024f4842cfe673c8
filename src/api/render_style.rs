use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// How the price series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStyle {
    #[default]
    Candlestick,
    /// Close prices joined by a polyline.
    Line,
    /// Line with the region under it filled.
    Area,
}

/// Colors and sizes for one render frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub up_color: Color,
    pub down_color: Color,
    pub line_color: Color,
    pub area_fill_color: Color,
    pub line_width_px: f64,
    /// Candle body width as a fraction of the per-bar slot.
    pub body_width_ratio: f64,
    pub show_last_price: bool,
    pub time_sync_line_color: Color,
    pub marker_color: Color,
    pub crosshair_color: Color,
    pub label_color: Color,
    pub label_font_size_px: f64,
    pub price_precision: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            up_color: Color::rgb(0.10, 0.65, 0.45),
            down_color: Color::rgb(0.86, 0.24, 0.26),
            line_color: Color::rgb(0.16, 0.47, 0.95),
            area_fill_color: Color::rgba(0.16, 0.47, 0.95, 0.18),
            line_width_px: 1.5,
            body_width_ratio: 0.7,
            show_last_price: true,
            time_sync_line_color: Color::rgba(0.55, 0.55, 0.60, 0.9),
            marker_color: Color::rgb(0.95, 0.65, 0.10),
            crosshair_color: Color::rgba(0.40, 0.40, 0.45, 0.8),
            label_color: Color::rgb(0.92, 0.92, 0.94),
            label_font_size_px: 11.0,
            price_precision: 2,
        }
    }
}

impl RenderStyle {
    pub fn validate(self) -> ChartResult<Self> {
        for color in [
            self.up_color,
            self.down_color,
            self.line_color,
            self.area_fill_color,
            self.time_sync_line_color,
            self.marker_color,
            self.crosshair_color,
            self.label_color,
        ] {
            color.validate()?;
        }
        if !self.line_width_px.is_finite() || self.line_width_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "line width must be finite and > 0".to_owned(),
            ));
        }
        if !self.body_width_ratio.is_finite()
            || self.body_width_ratio <= 0.0
            || self.body_width_ratio > 1.0
        {
            return Err(ChartError::InvalidData(
                "body width ratio must be in (0, 1]".to_owned(),
            ));
        }
        if !self.label_font_size_px.is_finite() || self.label_font_size_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "label font size must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}
