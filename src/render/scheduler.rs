//! Paint coalescing and per-frame loop bookkeeping.

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ChartError, ChartResult};

/// Upper bound for `min_frame_interval_ms`.
pub const MAX_FRAME_INTERVAL_MS: u64 = 1_000;
/// Upper bound for `settle_delay_ms`; the first reveal doubles it.
pub const MAX_SETTLE_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Minimum spacing between two paints.
    #[serde(default = "default_min_frame_interval_ms")]
    pub min_frame_interval_ms: u64,
    /// Delay before the first paint after the surface becomes visible.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_min_frame_interval_ms() -> u64 {
    16
}

fn default_settle_delay_ms() -> u64 {
    50
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_frame_interval_ms: default_min_frame_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if self.min_frame_interval_ms == 0 {
            return Err(ChartError::InvalidData(
                "min frame interval must be > 0".to_owned(),
            ));
        }
        if self.min_frame_interval_ms > MAX_FRAME_INTERVAL_MS {
            return Err(ChartError::InvalidData(format!(
                "min frame interval must be <= {MAX_FRAME_INTERVAL_MS} ms"
            )));
        }
        if self.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(ChartError::InvalidData(format!(
                "settle delay must be <= {MAX_SETTLE_DELAY_MS} ms"
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingPaint {
    NextFrame,
    Deferred { due: Instant },
}

/// Single-slot paint scheduler.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    config: SchedulerConfig,
    pending: Option<PendingPaint>,
    last_paint: Option<Instant>,
    visible: bool,
    awaiting_first_reveal: bool,
    paint_count: u64,
}

impl RenderScheduler {
    pub fn new(config: SchedulerConfig, visible: bool) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            pending: None,
            last_paint: None,
            visible,
            awaiting_first_reveal: !visible,
            paint_count: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingPaint> {
        self.pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    #[must_use]
    pub fn last_paint(&self) -> Option<Instant> {
        self.last_paint
    }

    fn min_interval(&self) -> Duration {
        Duration::from_millis(self.config.min_frame_interval_ms)
    }

    /// Requests a paint. Returns `true` when a new slot was taken.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if !self.visible {
            trace!("paint request while hidden; suspended");
            return false;
        }
        if self.pending.is_some() {
            return false;
        }
        let pending = match self.last_paint {
            Some(last) if now < last + self.min_interval() => PendingPaint::Deferred {
                due: last + self.min_interval(),
            },
            _ => PendingPaint::NextFrame,
        };
        trace!(?pending, "paint scheduled");
        self.pending = Some(pending);
        true
    }

    /// Consumes the slot when it is due. `true` means paint now.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.visible {
            return false;
        }
        let due = match self.pending {
            None => false,
            Some(PendingPaint::NextFrame) => true,
            Some(PendingPaint::Deferred { due }) => now >= due,
        };
        if due {
            self.pending = None;
            self.last_paint = Some(now);
            self.paint_count += 1;
        }
        due
    }

    /// When the host should call back; `now` for a next-frame paint.
    #[must_use]
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        if !self.visible {
            return None;
        }
        match self.pending? {
            PendingPaint::NextFrame => Some(now),
            PendingPaint::Deferred { due } => Some(due.max(now)),
        }
    }

    /// Hidden: cancel and suspend. Visible again: cancel, then one paint
    /// after the settle delay (doubled on the first reveal of a scheduler
    /// constructed hidden).
    pub fn set_visible(&mut self, visible: bool, now: Instant) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        self.pending = None;
        if !visible {
            debug!("surface hidden; painting suspended");
            return;
        }

        let mut settle = Duration::from_millis(self.config.settle_delay_ms);
        if self.awaiting_first_reveal {
            settle *= 2;
            self.awaiting_first_reveal = false;
        }
        self.pending = Some(PendingPaint::Deferred { due: now + settle });
        debug!(settle_ms = settle.as_millis() as u64, "surface visible; paint deferred");
    }

    pub fn cancel_all(&mut self) {
        self.pending = None;
    }
}

/// Independent per-frame loops, listed in the order they step within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FrameLoopKind {
    ActiveCandle,
    PriceRange,
    Momentum,
    TimeSync,
}

impl FrameLoopKind {
    pub const ALL: [Self; 4] = [
        Self::ActiveCandle,
        Self::PriceRange,
        Self::Momentum,
        Self::TimeSync,
    ];
}

/// Cancellable token for one armed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLoopHandle {
    pub kind: FrameLoopKind,
    pub generation: u64,
    pub armed_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct FrameLoopRegistry {
    handles: IndexMap<FrameLoopKind, FrameLoopHandle>,
    next_generation: u64,
}

impl FrameLoopRegistry {
    /// Arms `kind`; an already armed loop keeps its handle.
    pub fn arm(&mut self, kind: FrameLoopKind, now: Instant) -> FrameLoopHandle {
        if let Some(handle) = self.handles.get(&kind) {
            return *handle;
        }
        self.next_generation += 1;
        let handle = FrameLoopHandle {
            kind,
            generation: self.next_generation,
            armed_at: now,
        };
        self.handles.insert(kind, handle);
        trace!(?kind, generation = handle.generation, "frame loop armed");
        handle
    }

    pub fn disarm(&mut self, kind: FrameLoopKind) -> bool {
        let removed = self.handles.shift_remove(&kind).is_some();
        if removed {
            trace!(?kind, "frame loop disarmed");
        }
        removed
    }

    #[must_use]
    pub fn is_armed(&self, kind: FrameLoopKind) -> bool {
        self.handles.contains_key(&kind)
    }

    #[must_use]
    pub fn handle(&self, kind: FrameLoopKind) -> Option<FrameLoopHandle> {
        self.handles.get(&kind).copied()
    }

    /// Armed loops in stepping order.
    pub fn armed(&self) -> impl Iterator<Item = FrameLoopKind> + '_ {
        FrameLoopKind::ALL
            .into_iter()
            .filter(|kind| self.handles.contains_key(kind))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels every handle and returns how many were armed.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.handles.len();
        self.handles.clear();
        if count > 0 {
            debug!(count, "cancelled frame loops");
        }
        count
    }
}
