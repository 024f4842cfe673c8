use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::core::{Candle, FeedCandle, Placement, UpsertOutcome};
use crate::error::ChartResult;
use crate::render::{FrameLoopKind, Renderer};

use super::{ChartEngine, PluginEvent};

impl<R: Renderer> ChartEngine<R> {
    /// Streaming insert of one bar.
    ///
    /// - inside the tail's interval: tail update, eased when
    ///   `animate_tail_updates` is on
    /// - at or past the next boundary: new bar (any tail animation commits
    ///   first)
    /// - older than the tail, or invalid: dropped
    pub fn upsert_candle(&mut self, candle: Candle, now: Instant) -> UpsertOutcome {
        if self.reject_if_destroyed("upsert_candle") {
            return UpsertOutcome::Rejected;
        }
        self.core.runtime.last_now = Some(now);

        match self.core.model.store.classify(&candle) {
            Placement::First | Placement::NewBar => self.settle_tail_animation(),
            Placement::TailUpdate | Placement::Stale | Placement::Invalid => {}
        }

        let outcome = self.core.model.store.upsert(candle);
        match outcome {
            UpsertOutcome::TailUpdated { index, previous }
                if self.core.config.animate_tail_updates =>
            {
                let displayed = self
                    .core
                    .runtime
                    .tail_animator
                    .on_tail_update(index, previous, candle, now);
                if let Err(err) = self.core.model.store.replace_tail(displayed) {
                    warn!(error = %err, "could not publish animated tail");
                }
                if self.core.runtime.tail_animator.is_animating() {
                    self.core.runtime.loops.arm(FrameLoopKind::ActiveCandle, now);
                } else {
                    self.core.runtime.loops.disarm(FrameLoopKind::ActiveCandle);
                }
            }
            UpsertOutcome::Appended { index } => {
                let len = self.core.model.store.len();
                if !self.core.view.initialized {
                    self.core.view.controller.initialize(len);
                    self.core.view.initialized = true;
                } else if self.core.view.follow_latest && index + 1 == len {
                    self.core.view.controller.stick_to_right(len);
                }
            }
            UpsertOutcome::Rejected | UpsertOutcome::Stale | UpsertOutcome::Ignored => {
                trace!(?outcome, open_time = candle.open_time, "upsert dropped");
            }
            UpsertOutcome::TailUpdated { .. } | UpsertOutcome::Replaced { .. } => {}
        }

        if outcome.changed() {
            self.after_data_change(now);
        }
        outcome
    }

    /// Parses one feed bar and upserts it. Unparseable bars are dropped.
    pub fn upsert_feed_candle(&mut self, feed: &FeedCandle, now: Instant) -> UpsertOutcome {
        match feed.to_candle() {
            Ok(candle) => self.upsert_candle(candle, now),
            Err(err) => {
                trace!(error = %err, open_time = feed.open_time, "dropped feed candle");
                UpsertOutcome::Rejected
            }
        }
    }

    /// Parses a feed JSON payload (one bar or an array) and upserts every
    /// bar in order. Fails only when the payload itself is malformed.
    pub fn ingest_feed_json(
        &mut self,
        payload: &str,
        now: Instant,
    ) -> ChartResult<Vec<UpsertOutcome>> {
        let feed = FeedCandle::from_json_str(payload)?;
        Ok(feed
            .iter()
            .map(|candle| self.upsert_feed_candle(candle, now))
            .collect())
    }

    /// Replaces the whole series and resets view, animation, momentum and
    /// hover state.
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        if self.reject_if_destroyed("set_candles") {
            return;
        }
        let original_count = candles.len();
        self.core.model.store.reset(candles);
        debug!(
            original_count,
            canonical_count = self.core.model.store.len(),
            "set candles"
        );
        self.reset_view_state();
        let now = self.now();
        self.after_data_change(now);
    }

    /// Merges older history and shifts the window so the visible bars do
    /// not jump. Returns the number of bars inserted.
    pub fn prepend_candles(&mut self, candles: Vec<Candle>) -> usize {
        if self.reject_if_destroyed("prepend_candles") {
            return 0;
        }
        self.settle_tail_animation();
        let inserted = self.core.model.store.prepend(candles);
        if inserted == 0 {
            return 0;
        }

        if self.core.view.initialized {
            self.core.view.controller.shift(inserted as f64);
        } else {
            let len = self.core.model.store.len();
            self.core.view.controller.initialize(len);
            self.core.view.initialized = true;
        }
        self.emit_plugin_event(PluginEvent::HistoryPrepended { inserted });
        let now = self.now();
        self.after_data_change(now);
        inserted
    }

    /// Switches timeframe and atomically replaces the series.
    pub fn set_timeframe(&mut self, interval_ms: i64, candles: Vec<Candle>) -> ChartResult<()> {
        if self.reject_if_destroyed("set_timeframe") {
            return Ok(());
        }
        self.core.model.store.set_interval(interval_ms)?;
        self.core.config.timeframe_interval_ms = interval_ms;
        debug!(interval_ms, "timeframe changed");
        self.emit_plugin_event(PluginEvent::TimeframeChanged { interval_ms });
        self.set_candles(candles);
        Ok(())
    }

    /// Commits an in-flight tail animation to its target values.
    pub(super) fn settle_tail_animation(&mut self) {
        let Some((index, target)) = self.core.runtime.tail_animator.settle() else {
            return;
        };
        self.core.runtime.loops.disarm(FrameLoopKind::ActiveCandle);
        let store = &mut self.core.model.store;
        if index + 1 != store.len() {
            trace!(index, len = store.len(), "settled animation no longer targets the tail");
            return;
        }
        if let Err(err) = store.replace_tail(target) {
            warn!(error = %err, "could not commit settled tail animation");
        }
    }

    fn reset_view_state(&mut self) {
        let runtime = &mut self.core.runtime;
        runtime.tail_animator.cancel();
        runtime.price_range.cancel();
        runtime.momentum.cancel();
        runtime.time_sync.reset();
        runtime.loops.disarm(FrameLoopKind::ActiveCandle);
        runtime.loops.disarm(FrameLoopKind::PriceRange);
        runtime.loops.disarm(FrameLoopKind::Momentum);

        let view = &mut self.core.view;
        view.interaction.reset();
        view.controller.reset(self.core.config.initial_bars_per_screen);
        view.follow_latest = true;
        view.initialized = false;

        let len = self.core.model.store.len();
        if len > 0 {
            view.controller.initialize(len);
            view.initialized = true;
        }
    }

    fn after_data_change(&mut self, now: Instant) {
        let len = self.core.model.store.len();
        self.core.view.controller.clamp(len);
        self.signal_left_edge(len, now);
        self.refresh_price_range(now);
        self.arm_time_sync(now);
        self.emit_plugin_event(PluginEvent::CandlesUpdated { candles_len: len });
        self.core.runtime.scheduler.schedule(now);
    }
}
