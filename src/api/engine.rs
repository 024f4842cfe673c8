use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::animation::AnimationDriver;
use crate::core::coordinate::{pixel_to_time_price, price_to_pixel_y, time_to_pixel_x};
use crate::core::{Candle, Surface, TimePrice, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{HoverState, InteractionMode};
use crate::render::{FrameLoopKind, Renderer};

use super::engine_core::EngineCore;
use super::{ChartEngineConfig, PluginEvent};

/// Main facade consumed by host applications.
///
/// `ChartEngine` owns the candle store, viewport, animators and scheduler.
/// It is single-threaded and frame-driven: the host forwards feed updates
/// and input as they happen and calls [`ChartEngine::tick`] once per display
/// frame.
pub struct ChartEngine<R: Renderer> {
    pub(super) renderer: R,
    pub(super) core: EngineCore,
}

impl<R: Renderer> ChartEngine<R> {
    /// Validates `config` and acquires the renderer's drawing context.
    pub fn new(mut renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        renderer
            .prepare()
            .map_err(|err| ChartError::RenderContextUnavailable(err.to_string()))?;
        let core = EngineCore::new(config)?;
        debug!(
            interval_ms = config.timeframe_interval_ms,
            series_style = ?config.series_style,
            "chart engine created"
        );
        Ok(Self { renderer, core })
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.core.config
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        self.core.model.store.candles()
    }

    #[must_use]
    pub fn timeframe_interval_ms(&self) -> i64 {
        self.core.model.store.interval_ms()
    }

    #[must_use]
    pub fn surface(&self) -> Surface {
        self.renderer.surface()
    }

    /// Current window; `None` until the first data arrives.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.core
            .view
            .initialized
            .then(|| self.core.view.controller.viewport())
    }

    #[must_use]
    pub fn follow_price(&self) -> bool {
        self.core.view.follow_price
    }

    #[must_use]
    pub fn follows_latest(&self) -> bool {
        self.core.view.follow_latest
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.core.view.interaction.mode()
    }

    #[must_use]
    pub fn hover(&self) -> HoverState {
        self.core.view.interaction.hover()
    }

    #[must_use]
    pub fn is_tail_animating(&self) -> bool {
        self.core.runtime.tail_animator.is_animating()
    }

    #[must_use]
    pub fn is_momentum_active(&self) -> bool {
        self.core.runtime.momentum.is_coasting()
    }

    #[must_use]
    pub fn is_loop_armed(&self, kind: FrameLoopKind) -> bool {
        self.core.runtime.loops.is_armed(kind)
    }

    #[must_use]
    pub fn armed_loop_count(&self) -> usize {
        self.core.runtime.loops.len()
    }

    #[must_use]
    pub fn is_paint_pending(&self) -> bool {
        self.core.runtime.scheduler.is_pending()
    }

    #[must_use]
    pub fn paint_count(&self) -> u64 {
        self.core.runtime.scheduler.paint_count()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.core.runtime.scheduler.is_visible()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.core.runtime.destroyed
    }

    /// Displayed fractional index of the "now" marker.
    #[must_use]
    pub fn time_sync_index(&self) -> Option<f64> {
        self.core.runtime.time_sync.displayed_index()
    }

    /// Smoothed authoritative time at `now`, once a clock sample was seen.
    #[must_use]
    pub fn authoritative_time_estimate(&self, now: Instant) -> Option<f64> {
        self.core.runtime.time_sync.estimate(now)
    }

    #[must_use]
    pub fn timestamp_to_pixel(&self, time_ms: f64) -> Option<f64> {
        if !self.core.view.initialized {
            return None;
        }
        let store = &self.core.model.store;
        time_to_pixel_x(
            &self.core.view.controller.viewport(),
            self.renderer.surface(),
            store.candles(),
            store.interval_ms(),
            time_ms,
        )
    }

    #[must_use]
    pub fn price_to_pixel(&self, price: f64) -> Option<f64> {
        let viewport = self.core.view.controller.viewport();
        if !viewport.has_price_range() || !price.is_finite() {
            return None;
        }
        Some(price_to_pixel_y(&viewport, self.renderer.surface(), price))
    }

    #[must_use]
    pub fn pixel_to_time_price(&self, x: f64, y: f64) -> Option<TimePrice> {
        if !self.core.view.initialized {
            return None;
        }
        let store = &self.core.model.store;
        pixel_to_time_price(
            &self.core.view.controller.viewport(),
            self.renderer.surface(),
            store.candles(),
            store.interval_ms(),
            x,
            y,
        )
    }

    /// Installs the authoritative clock polled once per tick.
    pub fn set_authoritative_clock(&mut self, clock: impl Fn() -> i64 + 'static) {
        if self.reject_if_destroyed("set_authoritative_clock") {
            return;
        }
        self.core.runtime.clock = Some(Box::new(clock));
        self.core.runtime.time_sync.clear();
        let now = self.now();
        self.arm_time_sync(now);
        debug!("authoritative clock installed");
    }

    pub fn clear_authoritative_clock(&mut self) {
        self.core.runtime.clock = None;
        self.core.runtime.time_sync.clear();
        self.core.runtime.loops.disarm(FrameLoopKind::TimeSync);
    }

    /// Advances one display frame: poll the clock, step armed loops in
    /// registry order, clamp and detect edges, then paint at most once.
    ///
    /// Returns `true` when a frame was rendered.
    pub fn tick(&mut self, now: Instant) -> ChartResult<bool> {
        if self.core.runtime.destroyed {
            return Ok(false);
        }
        self.core.runtime.last_now = Some(now);

        if let Some(clock) = self.core.runtime.clock.as_ref() {
            let sample = clock();
            self.core.runtime.time_sync.observe(sample, now);
            self.arm_time_sync(now);
        }

        let armed: SmallVec<[FrameLoopKind; 4]> = self.core.runtime.loops.armed().collect();
        let mut dirty = false;
        let mut view_moved = false;
        let mut tail_changed = false;
        for kind in armed {
            let outcome = match kind {
                FrameLoopKind::ActiveCandle => {
                    tail_changed = true;
                    self.core
                        .runtime
                        .tail_animator
                        .step(now, &mut self.core.model.store)
                }
                FrameLoopKind::PriceRange => self
                    .core
                    .runtime
                    .price_range
                    .step(now, &mut self.core.view.controller),
                FrameLoopKind::Momentum => {
                    view_moved = true;
                    self.core
                        .runtime
                        .momentum
                        .step(now, &mut self.core.view.controller)
                }
                FrameLoopKind::TimeSync => {
                    let before = self.core.runtime.time_sync.displayed_index();
                    let outcome = self
                        .core
                        .runtime
                        .time_sync
                        .step(now, &mut self.core.model.store);
                    let after = self.core.runtime.time_sync.displayed_index();
                    let moved = match (before, after) {
                        (Some(a), Some(b)) => (a - b).abs() > 1e-6,
                        (None, None) => false,
                        _ => true,
                    };
                    if !moved {
                        trace!("time sync line unchanged");
                    }
                    dirty |= moved;
                    outcome
                }
            };
            if kind != FrameLoopKind::TimeSync {
                dirty = true;
            }
            if outcome.is_done() {
                self.core.runtime.loops.disarm(kind);
            }
        }

        if view_moved {
            self.after_view_change(now);
        } else if tail_changed {
            self.refresh_price_range(now);
        }

        if dirty {
            self.core.runtime.scheduler.schedule(now);
        }
        if self.core.runtime.scheduler.poll(now) {
            self.paint()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// When the host should call [`Self::tick`] next. `Some(now)` while any
    /// loop is running; `None` when idle.
    #[must_use]
    pub fn next_wakeup(&self, now: Instant) -> Option<Instant> {
        let runtime = &self.core.runtime;
        if runtime.destroyed || !runtime.scheduler.is_visible() {
            return None;
        }
        if !runtime.loops.is_empty() {
            return Some(now);
        }
        runtime.scheduler.next_deadline(now)
    }

    /// Hiding settles every loop and suspends painting; showing schedules
    /// one paint after the settle delay.
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if self.reject_if_destroyed("set_visible") {
            return;
        }
        self.core.runtime.last_now = Some(now);
        if !visible {
            self.settle_tail_animation();
            if let Some((min, max)) = self.core.runtime.price_range.target() {
                self.core.view.controller.set_price_range(min, max);
            }
            self.core.runtime.price_range.cancel();
            self.core.runtime.momentum.cancel();
            self.core.runtime.time_sync.reset();
            self.core.runtime.loops.cancel_all();
        }
        self.core.runtime.scheduler.set_visible(visible, now);
        if visible {
            self.arm_time_sync(now);
        }
        debug!(visible, "visibility changed");
    }

    /// Requests a repaint on the next due frame.
    pub fn redraw(&mut self) {
        if self.reject_if_destroyed("redraw") {
            return;
        }
        self.request_paint();
    }

    /// Cancels every outstanding loop and paint. Further mutations are
    /// logged no-ops.
    pub fn destroy(&mut self) {
        if self.core.runtime.destroyed {
            return;
        }
        let cancelled = self.core.runtime.loops.cancel_all();
        self.core.runtime.scheduler.cancel_all();
        self.core.runtime.tail_animator.cancel();
        self.core.runtime.price_range.cancel();
        self.core.runtime.momentum.cancel();
        self.core.runtime.clock = None;
        self.core.runtime.on_left_boundary = None;
        self.core.runtime.destroyed = true;
        debug!(cancelled, "chart engine destroyed");
    }

    pub(super) fn reject_if_destroyed(&self, operation: &'static str) -> bool {
        if self.core.runtime.destroyed {
            warn!(operation, "ignored call on destroyed chart engine");
        }
        self.core.runtime.destroyed
    }

    pub(super) fn now(&self) -> Instant {
        self.core.runtime.last_now.unwrap_or_else(Instant::now)
    }

    pub(super) fn request_paint(&mut self) {
        let now = self.now();
        self.core.runtime.scheduler.schedule(now);
    }

    pub(super) fn arm_time_sync(&mut self, now: Instant) {
        let runtime = &mut self.core.runtime;
        if runtime.clock.is_some()
            && runtime.scheduler.is_visible()
            && !self.core.model.store.is_empty()
        {
            runtime.loops.arm(FrameLoopKind::TimeSync, now);
        }
    }

    fn paint(&mut self) -> ChartResult<()> {
        let frame = self.build_render_frame()?;
        self.renderer.render(&frame)?;
        trace!(primitives = frame.primitive_count(), "frame rendered");
        self.emit_plugin_event(PluginEvent::Rendered);
        Ok(())
    }
}
