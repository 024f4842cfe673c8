use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::scale::LinearScale;
use crate::core::windowing::visible_price_extent;
use crate::core::Candle;
use crate::error::{ChartError, ChartResult};

/// Visible window over the bar-index axis plus the current price-axis range.
///
/// `to_index` is always `from_index + candles_per_screen`; indices are
/// fractional and may run past either end of the series within the
/// configured overshoot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub from_index: f64,
    pub to_index: f64,
    pub candles_per_screen: f64,
    pub center_index: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(from_index: f64, candles_per_screen: f64, min_price: f64, max_price: f64) -> Self {
        let mut viewport = Self {
            from_index,
            to_index: from_index + candles_per_screen,
            candles_per_screen,
            center_index: 0.0,
            min_price,
            max_price,
        };
        viewport.set_from(from_index);
        viewport
    }

    pub(crate) fn set_from(&mut self, from_index: f64) {
        self.from_index = from_index;
        self.to_index = from_index + self.candles_per_screen;
        self.center_index = (self.from_index + self.to_index) / 2.0;
    }

    pub fn index_scale(&self) -> ChartResult<LinearScale> {
        LinearScale::new(self.from_index, self.to_index)
    }

    pub fn price_scale(&self) -> ChartResult<LinearScale> {
        LinearScale::new(self.min_price, self.max_price)
    }

    /// `true` when the price range can be used for pixel math.
    #[must_use]
    pub fn has_price_range(&self) -> bool {
        self.min_price.is_finite() && self.max_price.is_finite() && self.max_price > self.min_price
    }

    /// Inclusive series-index bounds of the bars touching the window,
    /// `None` when the window does not overlap the series.
    #[must_use]
    pub fn visible_index_bounds(&self, series_len: usize) -> Option<(usize, usize)> {
        if series_len == 0 {
            return None;
        }
        let last = (series_len - 1) as f64;
        let lo = self.from_index.floor().max(0.0);
        let hi = self.to_index.ceil().min(last);
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return None;
        }
        Some((lo as usize, hi as usize))
    }
}

/// Zoom, overshoot and price padding bounds of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportLimits {
    pub min_bars_per_screen: f64,
    pub max_bars_per_screen: f64,
    /// Permitted scroll past either end, as a multiple of bars-per-screen.
    pub overshoot_ratio: f64,
    /// Whitespace kept right of the latest bar when sticking to the right edge.
    pub right_margin_bars: f64,
    /// Fraction of the visible price span added above and below.
    pub price_padding_ratio: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            min_bars_per_screen: 10.0,
            max_bars_per_screen: 400.0,
            overshoot_ratio: 0.5,
            right_margin_bars: 5.0,
            price_padding_ratio: 0.1,
        }
    }
}

impl ViewportLimits {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.min_bars_per_screen.is_finite() || self.min_bars_per_screen <= 0.0 {
            return Err(ChartError::InvalidData(
                "min bars per screen must be finite and > 0".to_owned(),
            ));
        }
        if !self.max_bars_per_screen.is_finite()
            || self.max_bars_per_screen < self.min_bars_per_screen
        {
            return Err(ChartError::InvalidData(
                "max bars per screen must be finite and >= min bars per screen".to_owned(),
            ));
        }
        if !self.overshoot_ratio.is_finite() || !(0.0..1.0).contains(&self.overshoot_ratio) {
            return Err(ChartError::InvalidData(
                "overshoot ratio must be finite and in [0, 1)".to_owned(),
            ));
        }
        if !self.right_margin_bars.is_finite() || self.right_margin_bars < 0.0 {
            return Err(ChartError::InvalidData(
                "right margin bars must be finite and >= 0".to_owned(),
            ));
        }
        if !self.price_padding_ratio.is_finite() || !(0.0..=0.5).contains(&self.price_padding_ratio)
        {
            return Err(ChartError::InvalidData(
                "price padding ratio must be finite and in [0, 0.5]".to_owned(),
            ));
        }
        Ok(self)
    }

    #[must_use]
    pub fn clamp_bars(self, candles_per_screen: f64) -> f64 {
        candles_per_screen.clamp(self.min_bars_per_screen, self.max_bars_per_screen)
    }
}

/// Debounce policy for the "reached left boundary" signal.
///
/// The thresholds are a tunable policy: hosts only rely on the signal being
/// rate-limited, not on exact timings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeTriggerPolicy {
    /// Signal when `from` is closer than this fraction of a screen to the
    /// lower clamp bound.
    pub proximity_ratio: f64,
    pub cooldown_ms: u64,
    /// Cooldown while sitting exactly on the boundary.
    pub boundary_rearm_ms: u64,
}

impl Default for EdgeTriggerPolicy {
    fn default() -> Self {
        Self {
            proximity_ratio: 0.3,
            cooldown_ms: 300,
            boundary_rearm_ms: 2_000,
        }
    }
}

impl EdgeTriggerPolicy {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.proximity_ratio.is_finite() || self.proximity_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "edge proximity ratio must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Payload of the left-boundary callback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeftBoundaryEvent {
    pub from_index: f64,
    /// Distance in bars between `from_index` and the lower clamp bound.
    pub distance_bars: f64,
    pub series_len: usize,
}

/// Outcome of a price-range recompute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceRangeDecision {
    Unchanged,
    /// Small change (or first range): apply immediately.
    Snap { min: f64, max: f64 },
    /// Material change: ease toward the new range.
    Animate { min: f64, max: f64 },
}

const MATERIAL_PRICE_CHANGE_RATIO: f64 = 0.01;

#[derive(Debug, Clone, Copy, Default)]
struct EdgeDetector {
    last_signal: Option<Instant>,
}

/// Owner of the [`Viewport`]: pan, zoom, clamp, price range and edge signals.
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    limits: ViewportLimits,
    edge_policy: EdgeTriggerPolicy,
    edge: EdgeDetector,
}

impl ViewportController {
    pub fn new(
        limits: ViewportLimits,
        edge_policy: EdgeTriggerPolicy,
        initial_bars_per_screen: f64,
    ) -> ChartResult<Self> {
        let limits = limits.validate()?;
        let edge_policy = edge_policy.validate()?;
        if !initial_bars_per_screen.is_finite() {
            return Err(ChartError::InvalidData(
                "initial bars per screen must be finite".to_owned(),
            ));
        }
        let candles_per_screen = limits.clamp_bars(initial_bars_per_screen);
        Ok(Self {
            viewport: Viewport::new(0.0, candles_per_screen, f64::NAN, f64::NAN),
            limits,
            edge_policy,
            edge: EdgeDetector::default(),
        })
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn limits(&self) -> ViewportLimits {
        self.limits
    }

    #[must_use]
    pub fn edge_policy(&self) -> EdgeTriggerPolicy {
        self.edge_policy
    }

    /// Shifts the window by `-delta_pixels * candles_per_screen / width` bars.
    ///
    /// Dragging right (positive delta) reveals older bars.
    pub fn pan(&mut self, delta_pixels: f64, width: f64) -> ChartResult<()> {
        validate_width(width)?;
        if !delta_pixels.is_finite() {
            return Err(ChartError::InvalidData(
                "pan delta must be finite".to_owned(),
            ));
        }
        let delta_index = -delta_pixels * self.viewport.candles_per_screen / width;
        self.viewport.set_from(self.viewport.from_index + delta_index);
        trace!(delta_pixels, delta_index, "viewport pan");
        Ok(())
    }

    /// Anchor-preserving zoom: the index under `anchor_pixel_x` stays under it.
    ///
    /// `factor > 1.0` zooms in (fewer bars), `0.0 < factor < 1.0` zooms out.
    pub fn zoom(&mut self, factor: f64, anchor_pixel_x: f64, width: f64) -> ChartResult<()> {
        validate_width(width)?;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ChartError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        if !anchor_pixel_x.is_finite() {
            return Err(ChartError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }

        let anchor_ratio = anchor_pixel_x / width;
        let anchor_index =
            self.viewport.from_index + anchor_ratio * self.viewport.candles_per_screen;
        let candles_per_screen = self
            .limits
            .clamp_bars(self.viewport.candles_per_screen / factor);

        self.viewport.candles_per_screen = candles_per_screen;
        self.viewport
            .set_from(anchor_index - anchor_ratio * candles_per_screen);
        debug!(factor, anchor_index, candles_per_screen, "viewport zoom");
        Ok(())
    }

    /// Allowed range of `from_index` for a series of `series_len` bars.
    ///
    /// The upper bound may fall below the lower one for very short series.
    #[must_use]
    pub fn from_bounds(&self, series_len: usize) -> (f64, f64) {
        let width = self.viewport.candles_per_screen;
        let overshoot = self.limits.overshoot_ratio * width;
        let last = series_len.saturating_sub(1) as f64;
        (-overshoot, last + overshoot - width)
    }

    /// Bounds `from_index` to [`Self::from_bounds`]; centers the data when the
    /// bounds cross. Returns `true` when the window moved.
    pub fn clamp(&mut self, series_len: usize) -> bool {
        if series_len == 0 {
            return false;
        }
        let (lower, upper) = self.from_bounds(series_len);
        let target = if upper < lower {
            (lower + upper) / 2.0
        } else {
            self.viewport.from_index.clamp(lower, upper)
        };
        let changed = target != self.viewport.from_index;
        self.viewport.set_from(target);
        changed
    }

    /// Places the latest bar at the right edge with the configured margin.
    pub fn stick_to_right(&mut self, series_len: usize) {
        if series_len == 0 {
            return;
        }
        let last = (series_len - 1) as f64;
        let to = last + 0.5 + self.limits.right_margin_bars;
        self.viewport.set_from(to - self.viewport.candles_per_screen);
        self.clamp(series_len);
    }

    /// Positions the window when the first data arrives. A single bar ends
    /// up centered since its clamp bounds collapse onto one position.
    pub fn initialize(&mut self, series_len: usize) {
        self.stick_to_right(series_len);
        debug!(
            series_len,
            from_index = self.viewport.from_index,
            "viewport initialized"
        );
    }

    /// Moves the window by whole bars, used after history is prepended.
    pub fn shift(&mut self, delta_index: f64) {
        if delta_index.is_finite() {
            self.viewport.set_from(self.viewport.from_index + delta_index);
        }
    }

    /// Restores the configured zoom and forgets price range and edge state.
    pub fn reset(&mut self, initial_bars_per_screen: f64) {
        let candles_per_screen = self.limits.clamp_bars(initial_bars_per_screen);
        self.viewport = Viewport::new(0.0, candles_per_screen, f64::NAN, f64::NAN);
        self.edge = EdgeDetector::default();
    }

    pub fn set_price_range(&mut self, min_price: f64, max_price: f64) {
        self.viewport.min_price = min_price;
        self.viewport.max_price = max_price;
    }

    /// Computes the price range of the visible bars and decides whether the
    /// change is material.
    ///
    /// `reference` is the range the decision is measured against, normally
    /// the in-flight animation target when one exists.
    #[must_use]
    pub fn recompute_price_range(
        &self,
        candles: &[Candle],
        marker_prices: &[f64],
        reference: Option<(f64, f64)>,
    ) -> PriceRangeDecision {
        let Some((lo, hi)) = self.viewport.visible_index_bounds(candles.len()) else {
            return PriceRangeDecision::Unchanged;
        };
        let Some((raw_min, raw_max)) = visible_price_extent(&candles[lo..=hi], marker_prices)
        else {
            return PriceRangeDecision::Unchanged;
        };
        let (min, max) = padded_price_range(raw_min, raw_max, self.limits.price_padding_ratio);

        let (ref_min, ref_max) =
            reference.unwrap_or((self.viewport.min_price, self.viewport.max_price));
        if !ref_min.is_finite() || !ref_max.is_finite() || ref_max <= ref_min {
            return PriceRangeDecision::Snap { min, max };
        }

        let span = ref_max - ref_min;
        let delta = (min - ref_min).abs().max((max - ref_max).abs());
        if delta <= span * 1e-12 {
            PriceRangeDecision::Unchanged
        } else if delta > span * MATERIAL_PRICE_CHANGE_RATIO {
            PriceRangeDecision::Animate { min, max }
        } else {
            PriceRangeDecision::Snap { min, max }
        }
    }

    /// Emits a left-boundary signal when the window is near the lower clamp
    /// bound and the debounce policy allows it.
    pub fn detect_left_edge(
        &mut self,
        series_len: usize,
        now: Instant,
    ) -> Option<LeftBoundaryEvent> {
        if series_len == 0 {
            return None;
        }
        let (lower, _) = self.from_bounds(series_len);
        let distance = self.viewport.from_index - lower;
        if distance >= self.edge_policy.proximity_ratio * self.viewport.candles_per_screen {
            return None;
        }

        let at_boundary = distance.abs() <= 1e-9;
        let allowed = match self.edge.last_signal {
            None => true,
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                let required = if at_boundary {
                    self.edge_policy.boundary_rearm_ms
                } else {
                    self.edge_policy.cooldown_ms
                };
                elapsed >= Duration::from_millis(required)
            }
        };
        if !allowed {
            return None;
        }

        self.edge.last_signal = Some(now);
        debug!(distance, at_boundary, series_len, "reached left boundary");
        Some(LeftBoundaryEvent {
            from_index: self.viewport.from_index,
            distance_bars: distance,
            series_len,
        })
    }
}

/// Pads a raw `[min, max]` extent and guards degenerate spans.
///
/// Non-finite input falls back to `[0, 1]`; a zero-height span is widened
/// around its value so pixel math never divides by zero.
#[must_use]
pub fn padded_price_range(min: f64, max: f64, padding_ratio: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() || max < min {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        let half = (max.abs() * 0.01).max(1e-6);
        return (min - half, max + half);
    }
    let pad = span * padding_ratio;
    (min - pad, max + pad)
}

fn validate_width(width: f64) -> ChartResult<()> {
    if !width.is_finite() || width <= 0.0 {
        return Err(ChartError::InvalidData(
            "surface width must be finite and > 0".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::padded_price_range;

    #[test]
    fn padded_range_widens_flat_extent() {
        let (min, max) = padded_price_range(100.0, 100.0, 0.1);
        assert!(min < 100.0 && max > 100.0);
        assert!((max - 100.0 - (100.0 - min)).abs() < 1e-12);
    }

    #[test]
    fn padded_range_falls_back_on_non_finite_input() {
        assert_eq!(padded_price_range(f64::NAN, 1.0, 0.1), (0.0, 1.0));
    }
}
