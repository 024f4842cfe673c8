use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::animation::{AnimationDriver, StepOutcome};
use crate::core::ViewportController;
use crate::error::{ChartError, ChartResult};

/// Tuning for inertial panning. Velocities are pixels per reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_reference_frame_ms")]
    pub reference_frame_ms: f64,
    /// Coasting stops below this speed.
    #[serde(default = "default_min_velocity")]
    pub min_velocity: f64,
    /// Release speed needed to start coasting.
    #[serde(default = "default_min_velocity_for_momentum")]
    pub min_velocity_for_momentum: f64,
    /// Per-frame velocity multiplier while coasting.
    #[serde(default = "default_friction")]
    pub friction: f64,
}

fn default_window_ms() -> u64 {
    100
}

fn default_reference_frame_ms() -> f64 {
    16.0
}

fn default_min_velocity() -> f64 {
    0.5
}

fn default_min_velocity_for_momentum() -> f64 {
    3.0
}

fn default_friction() -> f64 {
    0.96
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            reference_frame_ms: default_reference_frame_ms(),
            min_velocity: default_min_velocity(),
            min_velocity_for_momentum: default_min_velocity_for_momentum(),
            friction: default_friction(),
        }
    }
}

impl MomentumConfig {
    #[must_use]
    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        if !self.friction.is_finite() || self.friction <= 0.0 || self.friction >= 1.0 {
            return Err(ChartError::InvalidData(
                "momentum friction must be finite and in (0, 1)".to_owned(),
            ));
        }
        if !self.min_velocity.is_finite() || self.min_velocity <= 0.0 {
            return Err(ChartError::InvalidData(
                "momentum min velocity must be finite and > 0".to_owned(),
            ));
        }
        if !self.min_velocity_for_momentum.is_finite()
            || self.min_velocity_for_momentum < self.min_velocity
        {
            return Err(ChartError::InvalidData(
                "momentum start threshold must be finite and >= min velocity".to_owned(),
            ));
        }
        if self.window_ms == 0
            || !self.reference_frame_ms.is_finite()
            || self.reference_frame_ms <= 0.0
        {
            return Err(ChartError::InvalidData(
                "momentum window and reference frame must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Drag-velocity tracker and post-release coasting state.
#[derive(Debug, Clone)]
pub struct MomentumPan {
    config: MomentumConfig,
    samples: VecDeque<(Instant, f64)>,
    recent_velocities: SmallVec<[f64; 3]>,
    velocity: f64,
    dragging: bool,
    coasting: bool,
    surface_width: f64,
}

impl MomentumPan {
    pub fn new(config: MomentumConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            samples: VecDeque::new(),
            recent_velocities: SmallVec::new(),
            velocity: 0.0,
            dragging: false,
            coasting: false,
            surface_width: 0.0,
        })
    }

    #[must_use]
    pub fn config(&self) -> MomentumConfig {
        self.config
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    #[must_use]
    pub fn is_coasting(&self) -> bool {
        self.coasting
    }

    /// Starts tracking a new drag; cancels any coasting.
    pub fn begin_drag(&mut self) {
        self.cancel();
        self.dragging = true;
    }

    /// Records one pointer-move delta.
    pub fn record(&mut self, now: Instant, delta_x: f64) {
        if !self.dragging || !delta_x.is_finite() {
            return;
        }
        self.samples.push_back((now, delta_x));
        self.prune(now);
        self.velocity = self.window_velocity();
        if self.recent_velocities.len() == 3 {
            self.recent_velocities.remove(0);
        }
        self.recent_velocities.push(self.velocity);
        trace!(delta_x, velocity = self.velocity, "momentum sample");
    }

    /// Ends the drag. Returns `true` when coasting starts.
    pub fn release(&mut self, now: Instant, surface_width: f64) -> bool {
        if !self.dragging {
            return false;
        }
        self.dragging = false;
        self.prune(now);
        self.velocity = if self.samples.is_empty() {
            0.0
        } else {
            self.window_velocity()
        };
        self.surface_width = surface_width;

        let start = surface_width.is_finite()
            && surface_width > 0.0
            && self.should_start(self.velocity);
        self.coasting = start;
        self.samples.clear();
        self.recent_velocities.clear();
        if !start {
            self.velocity = 0.0;
        }
        debug!(velocity = self.velocity, coasting = start, "drag released");
        start
    }

    /// Stops dragging and coasting without starting momentum.
    pub fn cancel(&mut self) {
        self.samples.clear();
        self.recent_velocities.clear();
        self.velocity = 0.0;
        self.dragging = false;
        self.coasting = false;
    }

    /// Advances coasting by one frame and returns the pan delta in pixels.
    pub fn step_velocity(&mut self) -> Option<f64> {
        if !self.coasting {
            return None;
        }
        let delta = self.velocity;
        self.velocity *= self.config.friction;
        if self.velocity.abs() < self.config.min_velocity {
            self.coasting = false;
            self.velocity = 0.0;
            trace!("momentum settled");
        }
        Some(delta)
    }

    fn should_start(&self, velocity: f64) -> bool {
        let threshold = self.config.min_velocity_for_momentum;
        if velocity.abs() < threshold {
            return false;
        }
        if self.recent_velocities.len() < 3 {
            return true;
        }
        let average = self.recent_velocities.iter().map(|v| v.abs()).sum::<f64>() / 3.0;
        let first = self.recent_velocities[0].abs();
        let latest = self.recent_velocities[2].abs();
        let decelerating = latest < first * 0.5;
        average >= threshold && (!decelerating || latest >= threshold * 1.5)
    }

    fn prune(&mut self, now: Instant) {
        let window = Duration::from_millis(self.config.window_ms);
        while let Some(&(at, _)) = self.samples.front() {
            if now.saturating_duration_since(at) > window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn window_velocity(&self) -> f64 {
        let sum: f64 = self.samples.iter().map(|(_, dx)| dx).sum();
        let span_ms = match (self.samples.front(), self.samples.back()) {
            (Some((first, _)), Some((last, _))) => {
                last.saturating_duration_since(*first).as_secs_f64() * 1_000.0
            }
            _ => 0.0,
        };
        let span_ms = if span_ms > 0.0 {
            span_ms
        } else {
            self.config.reference_frame_ms
        };
        sum / span_ms * self.config.reference_frame_ms
    }
}

impl AnimationDriver<ViewportController> for MomentumPan {
    fn step(&mut self, _now: Instant, controller: &mut ViewportController) -> StepOutcome {
        let Some(delta) = self.step_velocity() else {
            return StepOutcome::Done;
        };
        if controller.pan(delta, self.surface_width).is_err() {
            self.cancel();
            return StepOutcome::Done;
        }
        if self.coasting {
            StepOutcome::Continue
        } else {
            StepOutcome::Done
        }
    }
}
