use std::time::{Duration, Instant};

use live_chart::animation::active_candle::tail_animation_duration;
use live_chart::animation::{ActiveCandleAnimator, AnimationDriver, StepOutcome};
use live_chart::core::{Candle, CandleStore};

fn store_with_tail(tail: Candle) -> CandleStore {
    let mut store = CandleStore::new(60_000).expect("store");
    store.reset(vec![Candle::flat(tail.open_time - 60_000, 100.0), tail]);
    store
}

fn apply_update(
    animator: &mut ActiveCandleAnimator,
    store: &mut CandleStore,
    incoming: Candle,
    now: Instant,
) {
    let index = store.len() - 1;
    let displayed = *store.last().expect("tail");
    let shown = animator.on_tail_update(index, displayed, incoming, now);
    store.replace_tail(shown).expect("publish");
}

#[test]
fn duration_scales_with_relative_move() {
    assert_eq!(tail_animation_duration(100.0, 100.0), Duration::from_millis(600));
    assert_eq!(tail_animation_duration(100.0, 115.0), Duration::from_millis(1_800));
    assert_eq!(tail_animation_duration(100.0, 50.0), Duration::from_millis(2_500));
    assert_eq!(tail_animation_duration(0.0, 50.0), Duration::from_millis(600));
}

#[test]
fn tween_eases_close_and_commits_target() {
    let t0 = Instant::now();
    let mut store = store_with_tail(Candle::flat(60_000, 100.0));
    let mut animator = ActiveCandleAnimator::default();
    let incoming = Candle::new(60_000, 100.0, 110.0, 99.0, 110.0);
    apply_update(&mut animator, &mut store, incoming, t0);

    assert!(animator.is_animating());
    assert_eq!(animator.target_index(), Some(1));
    assert_eq!(animator.target(), Some(incoming));
    assert_eq!(store.last().map(|c| c.close), Some(100.0));

    let mut previous = 100.0;
    for frame in 1..=75 {
        let outcome = animator.step(t0 + Duration::from_millis(frame * 16), &mut store);
        let tail = *store.last().expect("tail");
        assert!(tail.close >= previous);
        assert!(tail.high >= tail.close && tail.low <= tail.close);
        assert!(tail.is_valid());
        previous = tail.close;
        if outcome == StepOutcome::Done {
            break;
        }
    }

    assert_eq!(
        animator.step(t0 + Duration::from_millis(1_200), &mut store),
        StepOutcome::Done
    );
    assert_eq!(store.last().copied(), Some(incoming));
    assert!(!animator.is_animating());
}

#[test]
fn retarget_starts_from_interpolated_value() {
    let t0 = Instant::now();
    let mut store = store_with_tail(Candle::flat(60_000, 100.0));
    let mut animator = ActiveCandleAnimator::default();
    apply_update(
        &mut animator,
        &mut store,
        Candle::new(60_000, 100.0, 110.0, 100.0, 110.0),
        t0,
    );
    animator.step(t0 + Duration::from_millis(100), &mut store);
    let mid = store.last().expect("tail").close;
    assert!(mid > 100.0 && mid < 110.0);

    let retarget = Candle::new(60_000, 100.0, 110.0, 95.0, 95.0);
    apply_update(
        &mut animator,
        &mut store,
        retarget,
        t0 + Duration::from_millis(100),
    );
    assert!((store.last().expect("tail").close - mid).abs() <= 1e-12);
    assert_eq!(animator.target(), Some(retarget));

    animator.step(t0 + Duration::from_secs(5), &mut store);
    assert_eq!(store.last().copied(), Some(retarget));
}

#[test]
fn identical_update_does_not_restart_tween() {
    let t0 = Instant::now();
    let mut store = store_with_tail(Candle::flat(60_000, 100.0));
    let mut animator = ActiveCandleAnimator::default();
    let incoming = Candle::new(60_000, 100.0, 104.0, 100.0, 104.0);
    apply_update(&mut animator, &mut store, incoming, t0);
    animator.step(t0 + Duration::from_millis(300), &mut store);
    let shown = *store.last().expect("tail");

    apply_update(
        &mut animator,
        &mut store,
        incoming,
        t0 + Duration::from_millis(300),
    );
    assert_eq!(store.last().copied(), Some(shown));
    assert_eq!(
        animator.step(t0 + Duration::from_millis(600), &mut store),
        StepOutcome::Done
    );
    assert_eq!(store.last().copied(), Some(incoming));
}

#[test]
fn no_op_update_applies_without_animation() {
    let t0 = Instant::now();
    let tail = Candle::new(60_000, 100.0, 101.0, 99.0, 100.5);
    let mut store = store_with_tail(tail);
    let mut animator = ActiveCandleAnimator::default();
    let incoming = Candle::new(60_000, 99.5, 101.0, 99.0, 100.5);
    apply_update(&mut animator, &mut store, incoming, t0);

    assert!(!animator.is_animating());
    assert_eq!(store.last().copied(), Some(incoming));
}

#[test]
fn stops_when_target_is_no_longer_the_tail() {
    let t0 = Instant::now();
    let mut store = store_with_tail(Candle::flat(60_000, 100.0));
    let mut animator = ActiveCandleAnimator::default();
    apply_update(
        &mut animator,
        &mut store,
        Candle::new(60_000, 100.0, 120.0, 100.0, 120.0),
        t0,
    );
    store.upsert(Candle::flat(120_000, 120.0));

    assert_eq!(
        animator.step(t0 + Duration::from_millis(16), &mut store),
        StepOutcome::Done
    );
    assert!(!animator.is_animating());
}

#[test]
fn settle_returns_target_for_commit() {
    let t0 = Instant::now();
    let mut store = store_with_tail(Candle::flat(60_000, 100.0));
    let mut animator = ActiveCandleAnimator::default();
    let incoming = Candle::new(60_000, 100.0, 102.0, 98.0, 98.0);
    apply_update(&mut animator, &mut store, incoming, t0);

    assert_eq!(animator.settle(), Some((1, incoming)));
    assert_eq!(animator.settle(), None);
    animator.cancel();
    assert!(!animator.is_animating());
}

fn assert_between(value: f64, a: f64, b: f64) {
    let eps = 1e-9 * a.abs().max(b.abs());
    assert!(
        value >= a.min(b) - eps && value <= a.max(b) + eps,
        "{value} outside [{a}, {b}]"
    );
}

/// Steps until done, checking every frame against the start/target envelope.
fn run_within_envelope(
    animator: &mut ActiveCandleAnimator,
    store: &mut CandleStore,
    start: Candle,
    target: Candle,
    from: Instant,
) -> Vec<Candle> {
    let mut frames = Vec::new();
    for frame in 1..=400_u64 {
        let outcome = animator.step(from + Duration::from_millis(frame * 16), store);
        let tail = *store.last().expect("tail");
        assert_between(tail.close, start.close, target.close);
        assert_between(tail.high, start.high, target.high);
        assert_between(tail.low, start.low, target.low);
        assert!(tail.is_valid());
        frames.push(tail);
        if outcome == StepOutcome::Done {
            return frames;
        }
    }
    panic!("tail animation did not converge");
}

#[test]
fn widening_bar_stays_inside_envelope() {
    let t0 = Instant::now();
    let start = Candle::flat(60_000, 100.0);
    let mut store = store_with_tail(start);
    let mut animator = ActiveCandleAnimator::default();
    let target = Candle::new(60_000, 100.0, 108.0, 94.0, 103.0);
    apply_update(&mut animator, &mut store, target, t0);

    let frames = run_within_envelope(&mut animator, &mut store, start, target, t0);
    for pair in frames.windows(2) {
        assert!(pair[1].high >= pair[0].high);
        assert!(pair[1].low <= pair[0].low);
    }
    let last = frames.last().expect("frames");
    assert_eq!(*last, target);
    assert!(frames.iter().any(|candle| {
        candle.high > 100.0 && candle.high < 108.0 && candle.low < 100.0 && candle.low > 94.0
    }));
}

#[test]
fn reversed_retarget_stays_inside_new_envelope() {
    let t0 = Instant::now();
    let mut store = store_with_tail(Candle::flat(60_000, 100.0));
    let mut animator = ActiveCandleAnimator::default();
    apply_update(
        &mut animator,
        &mut store,
        Candle::new(60_000, 100.0, 110.0, 100.0, 110.0),
        t0,
    );
    animator.step(t0 + Duration::from_millis(100), &mut store);
    let t1 = t0 + Duration::from_millis(100);
    let shown = *store.last().expect("tail");
    assert!(shown.close > 100.0);

    let reversed = Candle::new(60_000, 100.0, 110.0, 95.0, 95.0);
    apply_update(&mut animator, &mut store, reversed, t1);
    assert_eq!(*store.last().expect("tail"), shown);

    let frames = run_within_envelope(&mut animator, &mut store, shown, reversed, t1);
    for pair in frames.windows(2) {
        assert!(pair[1].close <= pair[0].close);
    }
    assert_eq!(frames.last().copied(), Some(reversed));
}
