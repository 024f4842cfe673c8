//! Smoothed "now" marker driven by an external authoritative clock.
//!
//! The authoritative clock can drift from the local monotonic clock. Small
//! residuals are tolerated as jitter, large ones are absorbed gradually so
//! the marker never jumps. The marker position is a fractional bar index,
//! which keeps it glued to the bars across pan and zoom.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{AnimationDriver, StepOutcome};
use crate::core::CandleStore;
use crate::core::coordinate::time_to_index;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSyncConfig {
    /// Residuals above this start gradual convergence.
    #[serde(default = "default_convergence_threshold_ms")]
    pub convergence_threshold_ms: f64,
    /// Residuals below this re-anchor exactly.
    #[serde(default = "default_snap_threshold_ms")]
    pub snap_threshold_ms: f64,
    /// Fraction of the residual absorbed per frame while converging.
    #[serde(default = "default_convergence_rate")]
    pub convergence_rate: f64,
    /// Time constant of the displayed-index easing.
    #[serde(default = "default_smoothing_ms")]
    pub smoothing_ms: f64,
    #[serde(default = "default_max_index_per_second")]
    pub max_index_per_second: f64,
}

fn default_convergence_threshold_ms() -> f64 {
    200.0
}

fn default_snap_threshold_ms() -> f64 {
    20.0
}

fn default_convergence_rate() -> f64 {
    0.2
}

fn default_smoothing_ms() -> f64 {
    600.0
}

fn default_max_index_per_second() -> f64 {
    1.0
}

impl Default for TimeSyncConfig {
    fn default() -> Self {
        Self {
            convergence_threshold_ms: default_convergence_threshold_ms(),
            snap_threshold_ms: default_snap_threshold_ms(),
            convergence_rate: default_convergence_rate(),
            smoothing_ms: default_smoothing_ms(),
            max_index_per_second: default_max_index_per_second(),
        }
    }
}

impl TimeSyncConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.snap_threshold_ms.is_finite()
            || self.snap_threshold_ms < 0.0
            || !self.convergence_threshold_ms.is_finite()
            || self.convergence_threshold_ms < self.snap_threshold_ms
        {
            return Err(ChartError::InvalidData(
                "time sync thresholds must be finite with snap <= convergence".to_owned(),
            ));
        }
        if !self.convergence_rate.is_finite()
            || self.convergence_rate <= 0.0
            || self.convergence_rate > 1.0
        {
            return Err(ChartError::InvalidData(
                "time sync convergence rate must be in (0, 1]".to_owned(),
            ));
        }
        if !self.smoothing_ms.is_finite()
            || self.smoothing_ms <= 0.0
            || !self.max_index_per_second.is_finite()
            || self.max_index_per_second <= 0.0
        {
            return Err(ChartError::InvalidData(
                "time sync smoothing and speed cap must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Pairing of an authoritative timestamp with the local instant it was
/// observed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockAnchor {
    pub authoritative_ms: f64,
    pub local: Instant,
}

impl ClockAnchor {
    #[must_use]
    pub fn new(authoritative_ms: f64, local: Instant) -> Self {
        Self {
            authoritative_ms,
            local,
        }
    }

    #[must_use]
    pub fn estimate(&self, now: Instant) -> f64 {
        self.authoritative_ms + now.saturating_duration_since(self.local).as_secs_f64() * 1_000.0
    }
}

#[derive(Debug, Clone)]
pub struct TimeSyncLine {
    config: TimeSyncConfig,
    anchor: Option<ClockAnchor>,
    converging: bool,
    displayed_index: Option<f64>,
    target_index: Option<f64>,
    first_key: Option<i64>,
    last_step: Option<Instant>,
}

impl TimeSyncLine {
    pub fn new(config: TimeSyncConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            anchor: None,
            converging: false,
            displayed_index: None,
            target_index: None,
            first_key: None,
            last_step: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> TimeSyncConfig {
        self.config
    }

    #[must_use]
    pub fn anchor(&self) -> Option<ClockAnchor> {
        self.anchor
    }

    #[must_use]
    pub fn is_converging(&self) -> bool {
        self.converging
    }

    #[must_use]
    pub fn estimate(&self, now: Instant) -> Option<f64> {
        self.anchor.map(|anchor| anchor.estimate(now))
    }

    #[must_use]
    pub fn displayed_index(&self) -> Option<f64> {
        self.displayed_index
    }

    #[must_use]
    pub fn target_index(&self) -> Option<f64> {
        self.target_index
    }

    /// Feeds one authoritative clock sample.
    pub fn observe(&mut self, sample_ms: i64, now: Instant) {
        let sample = sample_ms as f64;
        let Some(anchor) = self.anchor.as_mut() else {
            self.anchor = Some(ClockAnchor::new(sample, now));
            self.converging = false;
            debug!(sample_ms, "clock anchored");
            return;
        };

        let residual = sample - anchor.estimate(now);
        let magnitude = residual.abs();
        if self.converging {
            if magnitude < self.config.snap_threshold_ms {
                *anchor = ClockAnchor::new(sample, now);
                self.converging = false;
                debug!(residual, "clock converged");
            } else {
                anchor.authoritative_ms += residual * self.config.convergence_rate;
            }
        } else if magnitude > self.config.convergence_threshold_ms {
            self.converging = true;
            anchor.authoritative_ms += residual * self.config.convergence_rate;
            debug!(residual, "clock drift; converging");
        } else if magnitude < self.config.snap_threshold_ms {
            *anchor = ClockAnchor::new(sample, now);
        } else {
            trace!(residual, "clock jitter tolerated");
        }
    }

    /// Forces the next step to snap to its target.
    pub fn reset(&mut self) {
        self.displayed_index = None;
        self.target_index = None;
        self.first_key = None;
        self.last_step = None;
    }

    /// Drops the clock anchor as well, used when the clock source changes.
    pub fn clear(&mut self) {
        self.reset();
        self.anchor = None;
        self.converging = false;
    }
}

impl AnimationDriver<CandleStore> for TimeSyncLine {
    fn step(&mut self, now: Instant, store: &mut CandleStore) -> StepOutcome {
        let Some(estimate) = self.estimate(now) else {
            return StepOutcome::Done;
        };
        let Some(first_key) = store.first().map(|candle| candle.open_time) else {
            self.reset();
            return StepOutcome::Done;
        };
        let Some(target) = time_to_index(store.candles(), store.interval_ms(), estimate) else {
            return StepOutcome::Done;
        };
        self.target_index = Some(target);

        let snap = self.first_key != Some(first_key);
        let displayed = match (self.displayed_index, self.last_step) {
            (Some(displayed), Some(last)) if !snap => {
                let dt = now.saturating_duration_since(last).as_secs_f64();
                let alpha = 1.0 - (-dt * 1_000.0 / self.config.smoothing_ms).exp();
                let cap = self.config.max_index_per_second * dt;
                displayed + ((target - displayed) * alpha).clamp(-cap, cap)
            }
            _ => {
                trace!(target, first_key, "time sync line snapped");
                target
            }
        };

        self.displayed_index = Some(displayed);
        self.first_key = Some(first_key);
        self.last_step = Some(now);
        StepOutcome::Continue
    }
}
