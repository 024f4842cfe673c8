//! Per-frame loops driven by [`crate::ChartEngine::tick`].
//!
//! Each loop keeps its state in an `Option` and advances one step per
//! display frame through [`AnimationDriver`].

pub mod active_candle;
pub mod price_range;
pub mod time_sync;

use std::time::Instant;

pub use active_candle::ActiveCandleAnimator;
pub use price_range::PriceRangeAnimator;
pub use time_sync::{ClockAnchor, TimeSyncConfig, TimeSyncLine};

/// Whether a loop wants another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Done,
}

impl StepOutcome {
    #[must_use]
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// One frame of a per-frame loop acting on `T`.
pub trait AnimationDriver<T: ?Sized> {
    fn step(&mut self, now: Instant, target: &mut T) -> StepOutcome;
}

/// Exponential ease-out; exactly `1.0` at `p == 1.0`.
#[must_use]
pub fn ease_out_expo(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    if p >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * p)
    }
}

#[must_use]
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[must_use]
pub(crate) fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

#[cfg(test)]
mod tests {
    use super::{ease_out_cubic, ease_out_expo};

    #[test]
    fn easings_hit_endpoints() {
        assert_eq!(ease_out_expo(0.0), 0.0);
        assert_eq!(ease_out_expo(1.0), 1.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_expo(0.5) > 0.5);
    }
}
