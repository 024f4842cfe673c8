use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::animation::{AnimationDriver, StepOutcome, ease_out_expo, lerp};
use crate::core::{Candle, CandleStore};

const RELATIVE_EPSILON: f64 = 1e-9;
const DURATION_SCALE_MS: f64 = 12_000.0;
const MIN_DURATION_MS: f64 = 600.0;
const MAX_DURATION_MS: f64 = 2_500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Hlc {
    close: f64,
    high: f64,
    low: f64,
}

impl Hlc {
    fn of(candle: &Candle) -> Self {
        Self {
            close: candle.close,
            high: candle.high,
            low: candle.low,
        }
    }

    fn approx_eq(self, other: Self) -> bool {
        close_enough(self.close, other.close)
            && close_enough(self.high, other.high)
            && close_enough(self.low, other.low)
    }
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() <= RELATIVE_EPSILON * a.abs().max(b.abs())
}

#[derive(Debug, Clone, Copy)]
struct TailTween {
    target_index: usize,
    open_time: i64,
    open: f64,
    start: Hlc,
    target: Hlc,
    current: Hlc,
    started_at: Instant,
    duration: Duration,
}

impl TailTween {
    fn candle(&self, hlc: Hlc) -> Candle {
        Candle::new(
            self.open_time,
            self.open,
            hlc.high.max(hlc.close).max(self.open),
            hlc.low.min(hlc.close).min(self.open),
            hlc.close,
        )
    }

    fn target_candle(&self) -> Candle {
        Candle::new(
            self.open_time,
            self.open,
            self.target.high,
            self.target.low,
            self.target.close,
        )
    }
}

/// Duration grows with the relative close move, clamped to 600..=2500 ms.
#[must_use]
pub fn tail_animation_duration(from_close: f64, to_close: f64) -> Duration {
    let relative = if from_close.abs() > 0.0 {
        ((to_close - from_close) / from_close).abs()
    } else {
        0.0
    };
    let ms = (relative * DURATION_SCALE_MS).clamp(MIN_DURATION_MS, MAX_DURATION_MS);
    Duration::from_micros((ms * 1_000.0).round() as u64)
}

/// Eases the still-open trailing bar toward freshly delivered values.
///
/// The store always holds the *displayed* bar; the animator owns the target.
#[derive(Debug, Clone, Default)]
pub struct ActiveCandleAnimator {
    state: Option<TailTween>,
}

impl ActiveCandleAnimator {
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn target_index(&self) -> Option<usize> {
        self.state.map(|tween| tween.target_index)
    }

    /// The bar the animation will commit when it finishes.
    #[must_use]
    pub fn target(&self) -> Option<Candle> {
        self.state.map(|tween| tween.target_candle())
    }

    /// Handles a tail update and returns the bar to display right now.
    ///
    /// `displayed` is what the store held before the update. The incoming
    /// open is committed immediately; close/high/low start easing from the
    /// displayed (or in-flight interpolated) values.
    pub fn on_tail_update(
        &mut self,
        index: usize,
        displayed: Candle,
        incoming: Candle,
        now: Instant,
    ) -> Candle {
        let target = Hlc::of(&incoming);
        let start = match self.state {
            Some(tween) if tween.target_index == index => {
                if tween.target.approx_eq(target) {
                    let mut tween = tween;
                    tween.open = incoming.open;
                    let shown = tween.candle(tween.current);
                    self.state = Some(tween);
                    return shown;
                }
                tween.current
            }
            _ => Hlc::of(&displayed),
        };

        if start.approx_eq(target) {
            self.state = None;
            return Candle {
                open_time: displayed.open_time,
                ..incoming
            };
        }

        let duration = tail_animation_duration(start.close, target.close);
        let tween = TailTween {
            target_index: index,
            open_time: displayed.open_time,
            open: incoming.open,
            start,
            target,
            current: start,
            started_at: now,
            duration,
        };
        debug!(
            index,
            from_close = start.close,
            to_close = target.close,
            duration_ms = duration.as_millis() as u64,
            "tail animation (re)targeted"
        );
        self.state = Some(tween);
        tween.candle(start)
    }

    /// Stops the animation and returns the target bar so the caller can
    /// commit it before the series moves on.
    pub fn settle(&mut self) -> Option<(usize, Candle)> {
        let tween = self.state.take()?;
        trace!(index = tween.target_index, "tail animation settled");
        Some((tween.target_index, tween.target_candle()))
    }

    pub fn cancel(&mut self) {
        self.state = None;
    }
}

impl AnimationDriver<CandleStore> for ActiveCandleAnimator {
    fn step(&mut self, now: Instant, store: &mut CandleStore) -> StepOutcome {
        let Some(mut tween) = self.state else {
            return StepOutcome::Done;
        };
        if store.is_empty() || tween.target_index != store.len() - 1 {
            debug!(
                target_index = tween.target_index,
                len = store.len(),
                "tail animation target out of range; stopping"
            );
            self.state = None;
            return StepOutcome::Done;
        }

        let elapsed = now.saturating_duration_since(tween.started_at).as_secs_f64();
        let duration = tween.duration.as_secs_f64();
        let progress = if duration > 0.0 {
            (elapsed / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let (candle, outcome) = if progress >= 1.0 {
            self.state = None;
            (tween.target_candle(), StepOutcome::Done)
        } else {
            let eased = ease_out_expo(progress);
            let close = lerp(tween.start.close, tween.target.close, eased);
            tween.current = Hlc {
                close,
                high: lerp(tween.start.high, tween.target.high, eased).max(close),
                low: lerp(tween.start.low, tween.target.low, eased).min(close),
            };
            self.state = Some(tween);
            (tween.candle(tween.current), StepOutcome::Continue)
        };

        if let Err(err) = store.replace_tail(candle) {
            warn!(error = %err, "tail animation could not publish frame");
            self.state = None;
            return StepOutcome::Done;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::tail_animation_duration;

    #[test]
    fn duration_is_clamped() {
        assert_eq!(tail_animation_duration(100.0, 100.001), Duration::from_millis(600));
        assert_eq!(tail_animation_duration(100.0, 200.0), Duration::from_millis(2_500));
        let mid = tail_animation_duration(100.0, 110.0);
        assert!((mid.as_secs_f64() - 1.2).abs() < 1e-9);
    }
}
