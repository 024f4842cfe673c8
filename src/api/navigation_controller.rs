use std::time::Instant;

use tracing::{debug, trace};

use crate::core::{LeftBoundaryEvent, PriceRangeDecision};
use crate::error::ChartResult;
use crate::extensions::{PriceMarker, index_price_markers};
use crate::render::{FrameLoopKind, Renderer};

use super::{ChartEngine, PluginEvent};

impl<R: Renderer> ChartEngine<R> {
    /// Turns price auto-fit on or off. Turning it on refits immediately.
    pub fn set_follow_price(&mut self, follow: bool) {
        if self.reject_if_destroyed("set_follow_price") {
            return;
        }
        self.core.view.follow_price = follow;
        debug!(follow, "follow price");
        if follow {
            let now = self.now();
            self.refresh_price_range(now);
            self.request_paint();
        }
    }

    /// Scrolls so the newest bar sits at the right edge and keeps it there
    /// as bars arrive.
    pub fn stick_to_right(&mut self) {
        if self.reject_if_destroyed("stick_to_right") {
            return;
        }
        self.cancel_momentum();
        let len = self.core.model.store.len();
        self.core.view.controller.stick_to_right(len);
        self.core.view.follow_latest = true;
        let now = self.now();
        self.after_view_change(now);
    }

    /// Drops hover and momentum, restores the configured zoom, and resumes
    /// following both the latest bar and the price.
    pub fn reset_user_interaction_and_follow(&mut self) {
        if self.reject_if_destroyed("reset_user_interaction_and_follow") {
            return;
        }
        self.cancel_momentum();
        self.core.view.interaction.reset();
        self.core
            .view
            .controller
            .reset(self.core.config.initial_bars_per_screen);
        let len = self.core.model.store.len();
        self.core.view.initialized = len > 0;
        if len > 0 {
            self.core.view.controller.initialize(len);
        }
        self.core.view.follow_latest = true;
        self.core.view.follow_price = true;
        self.core.runtime.price_range.cancel();
        self.core.runtime.loops.disarm(FrameLoopKind::PriceRange);
        debug!("user interaction reset; following latest and price");
        let now = self.now();
        self.after_view_change(now);
    }

    /// Anchor-preserving zoom. `factor > 1.0` zooms in.
    pub fn wheel_zoom(&mut self, factor: f64, anchor_x: f64, now: Instant) -> ChartResult<()> {
        if self.reject_if_destroyed("wheel_zoom") {
            return Ok(());
        }
        self.core.runtime.last_now = Some(now);
        self.cancel_momentum();
        let width = self.renderer.surface().width;
        self.core.view.controller.zoom(factor, anchor_x, width)?;
        self.core.view.follow_latest = false;
        self.after_view_change(now);
        Ok(())
    }

    /// Programmatic pan by `delta_pixels` (positive reveals older bars).
    pub fn pan_by(&mut self, delta_pixels: f64, now: Instant) -> ChartResult<()> {
        if self.reject_if_destroyed("pan_by") {
            return Ok(());
        }
        self.core.runtime.last_now = Some(now);
        let width = self.renderer.surface().width;
        self.core.view.controller.pan(delta_pixels, width)?;
        self.core.view.follow_latest = false;
        self.after_view_change(now);
        Ok(())
    }

    /// Replaces the price-anchored overlay markers.
    pub fn set_price_markers(&mut self, markers: Vec<PriceMarker>) -> ChartResult<()> {
        if self.reject_if_destroyed("set_price_markers") {
            return Ok(());
        }
        self.core.model.price_markers = index_price_markers(markers)?;
        debug!(count = self.core.model.price_markers.len(), "price markers set");
        let now = self.now();
        self.refresh_price_range(now);
        self.request_paint();
        Ok(())
    }

    #[must_use]
    pub fn price_markers(&self) -> Vec<PriceMarker> {
        self.core.model.price_markers.values().cloned().collect()
    }

    /// Registers the callback fired when the window nears the oldest bar.
    pub fn on_reach_left_boundary(&mut self, callback: impl FnMut(LeftBoundaryEvent) + 'static) {
        if self.reject_if_destroyed("on_reach_left_boundary") {
            return;
        }
        self.core.runtime.on_left_boundary = Some(Box::new(callback));
    }

    pub(super) fn cancel_momentum(&mut self) {
        self.core.runtime.momentum.cancel();
        self.core.runtime.loops.disarm(FrameLoopKind::Momentum);
    }

    /// Clamp, edge detection, price refit, plugin notification and paint
    /// after any change of the window.
    pub(super) fn after_view_change(&mut self, now: Instant) {
        let len = self.core.model.store.len();
        self.core.view.controller.clamp(len);
        self.signal_left_edge(len, now);
        self.refresh_price_range(now);
        let viewport = self.core.view.controller.viewport();
        self.emit_plugin_event(PluginEvent::ViewportChanged {
            from_index: viewport.from_index,
            to_index: viewport.to_index,
        });
        self.core.runtime.scheduler.schedule(now);
    }

    /// Notifies the callback and plugins when the window sits near the
    /// oldest bar, subject to the edge debounce.
    pub(super) fn signal_left_edge(&mut self, series_len: usize, now: Instant) {
        let Some(event) = self.core.view.controller.detect_left_edge(series_len, now) else {
            return;
        };
        if let Some(callback) = self.core.runtime.on_left_boundary.as_mut() {
            callback(event);
        }
        self.emit_plugin_event(PluginEvent::ReachedLeftBoundary(event));
    }

    /// Recomputes the auto price range; material changes are eased.
    ///
    /// With follow-price off the range is only set when it was never
    /// initialized.
    pub(super) fn refresh_price_range(&mut self, now: Instant) {
        let current = self.core.view.controller.viewport();
        if !self.core.view.follow_price && current.has_price_range() {
            return;
        }
        let markers = self.core.marker_prices();
        let animating = self.core.runtime.price_range.is_animating();
        let decision = self.core.view.controller.recompute_price_range(
            self.core.model.store.candles(),
            &markers,
            self.core.runtime.price_range.target(),
        );

        match decision {
            PriceRangeDecision::Unchanged => {}
            PriceRangeDecision::Snap { min, max } if !animating => {
                trace!(min, max, "price range snapped");
                self.core.view.controller.set_price_range(min, max);
            }
            PriceRangeDecision::Snap { min, max } | PriceRangeDecision::Animate { min, max } => {
                self.core.runtime.price_range.start(
                    (current.min_price, current.max_price),
                    (min, max),
                    now,
                );
                self.core.runtime.loops.arm(FrameLoopKind::PriceRange, now);
            }
        }
    }
}
