use serde::{Deserialize, Serialize};

/// Drawable surface geometry in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Surface {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A chart-space coordinate resolved from a pixel position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePrice {
    /// Epoch milliseconds, possibly fractional between bars.
    pub time: f64,
    pub price: f64,
}

impl TimePrice {
    #[must_use]
    pub const fn new(time: f64, price: f64) -> Self {
        Self { time, price }
    }
}
