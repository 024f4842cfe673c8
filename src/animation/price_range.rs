use std::time::{Duration, Instant};

use tracing::trace;

use crate::animation::{AnimationDriver, StepOutcome, ease_out_cubic, lerp};
use crate::core::ViewportController;

pub const PRICE_RANGE_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq)]
struct RangeTween {
    from: (f64, f64),
    to: (f64, f64),
    started_at: Instant,
}

/// Eases the viewport's `[min_price, max_price]` toward a new target.
#[derive(Debug, Clone, Default)]
pub struct PriceRangeAnimator {
    state: Option<RangeTween>,
}

impl PriceRangeAnimator {
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn target(&self) -> Option<(f64, f64)> {
        self.state.map(|tween| tween.to)
    }

    /// Starts (or restarts) a tween from the currently displayed range.
    pub fn start(&mut self, from: (f64, f64), to: (f64, f64), now: Instant) {
        trace!(
            from_min = from.0,
            from_max = from.1,
            to_min = to.0,
            to_max = to.1,
            "price range animation"
        );
        self.state = Some(RangeTween {
            from,
            to,
            started_at: now,
        });
    }

    pub fn cancel(&mut self) {
        self.state = None;
    }
}

impl AnimationDriver<ViewportController> for PriceRangeAnimator {
    fn step(&mut self, now: Instant, controller: &mut ViewportController) -> StepOutcome {
        let Some(tween) = self.state else {
            return StepOutcome::Done;
        };
        let elapsed = now.saturating_duration_since(tween.started_at);
        let progress = elapsed.as_secs_f64() / PRICE_RANGE_DURATION.as_secs_f64();
        if progress >= 1.0 {
            controller.set_price_range(tween.to.0, tween.to.1);
            self.state = None;
            return StepOutcome::Done;
        }
        let eased = ease_out_cubic(progress);
        controller.set_price_range(
            lerp(tween.from.0, tween.to.0, eased),
            lerp(tween.from.1, tween.to.1, eased),
        );
        StepOutcome::Continue
    }
}
