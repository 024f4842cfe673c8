use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use live_chart::animation::{AnimationDriver, StepOutcome, TimeSyncConfig, TimeSyncLine};
use live_chart::core::{Candle, CandleStore};

const INTERVAL: i64 = 60_000;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn store(count: i64, first_open_time: i64) -> CandleStore {
    let mut store = CandleStore::new(INTERVAL).expect("store");
    store.reset(
        (0..count)
            .map(|i| Candle::flat(first_open_time + i * INTERVAL, 100.0))
            .collect(),
    );
    store
}

fn line() -> TimeSyncLine {
    TimeSyncLine::new(TimeSyncConfig::default()).expect("time sync line")
}

#[test]
fn config_validation() {
    let config = TimeSyncConfig {
        snap_threshold_ms: 500.0,
        ..TimeSyncConfig::default()
    };
    assert!(TimeSyncLine::new(config).is_err());
    let config = TimeSyncConfig {
        convergence_rate: 0.0,
        ..TimeSyncConfig::default()
    };
    assert!(TimeSyncLine::new(config).is_err());
}

#[test]
fn first_sample_anchors_clock() {
    let t0 = Instant::now();
    let mut line = line();
    assert_eq!(line.estimate(t0), None);
    line.observe(1_000, t0);
    assert_abs_diff_eq!(line.estimate(t0 + ms(250)).expect("estimate"), 1_250.0, epsilon = 1e-9);
    assert!(!line.is_converging());
}

#[test]
fn small_residual_reanchors_exactly() {
    let t0 = Instant::now();
    let mut line = line();
    line.observe(1_000, t0);
    line.observe(1_026, t0 + ms(16));
    let anchor = line.anchor().expect("anchor");
    assert_eq!(anchor.authoritative_ms, 1_026.0);
    assert_eq!(anchor.local, t0 + ms(16));
}

#[test]
fn jitter_band_is_tolerated() {
    let t0 = Instant::now();
    let mut line = line();
    line.observe(1_000, t0);
    line.observe(1_116, t0 + ms(16));
    assert!(!line.is_converging());
    assert_abs_diff_eq!(line.estimate(t0 + ms(16)).expect("estimate"), 1_016.0, epsilon = 1e-9);
}

#[test]
fn large_drift_converges_gradually_without_jumps() {
    let t0 = Instant::now();
    let mut line = line();
    line.observe(0, t0);

    let drift = 1_000_i64;
    let mut previous_estimate = 0.0;
    let mut converged_at = None;
    for frame in 1..=100_u64 {
        let now = t0 + ms(frame * 16);
        let truth = drift + (frame * 16) as i64;
        let before = line.estimate(now).expect("estimate");
        line.observe(truth, now);
        let after = line.estimate(now).expect("estimate");

        let residual = truth as f64 - before;
        assert!(after - before <= residual.abs() * 0.2 + 20.0);
        assert!(after >= previous_estimate);
        previous_estimate = after;
        if !line.is_converging() && frame > 1 {
            converged_at = Some(frame);
            break;
        }
    }
    assert!(converged_at.is_some());
}

#[test]
fn first_step_snaps_to_clock_index() {
    let t0 = Instant::now();
    let mut store = store(10, 0);
    let mut line = line();
    line.observe(5 * INTERVAL + 30_000, t0);

    assert_eq!(line.step(t0, &mut store), StepOutcome::Continue);
    assert_abs_diff_eq!(line.displayed_index().expect("index"), 5.5, epsilon = 1e-12);
    assert_abs_diff_eq!(line.target_index().expect("target"), 5.5, epsilon = 1e-12);
}

#[test]
fn displayed_index_speed_is_capped() {
    let t0 = Instant::now();
    let mut store = store(20, 0);
    let mut line = line();
    line.observe(5 * INTERVAL, t0);
    line.step(t0, &mut store);
    assert_abs_diff_eq!(line.displayed_index().expect("index"), 5.0, epsilon = 1e-12);

    let t1 = t0 + ms(100);
    line.observe(5 * INTERVAL + 100 + 10 * INTERVAL, t1);
    assert!(line.is_converging());
    line.step(t1, &mut store);
    let target = line.target_index().expect("target");
    assert!(target > 7.0);
    assert_abs_diff_eq!(line.displayed_index().expect("index"), 5.1, epsilon = 1e-9);
}

#[test]
fn prepend_changes_first_key_and_snaps() {
    let t0 = Instant::now();
    let mut store = store(10, 10 * INTERVAL);
    let mut line = line();
    line.observe(15 * INTERVAL, t0);
    line.step(t0, &mut store);
    assert_abs_diff_eq!(line.displayed_index().expect("index"), 5.0, epsilon = 1e-12);

    store.prepend((0..10).map(|i| Candle::flat(i * INTERVAL, 100.0)).collect());
    line.step(t0 + ms(16), &mut store);
    let expected = 15.0 + 16.0 / INTERVAL as f64;
    assert_abs_diff_eq!(line.displayed_index().expect("index"), expected, epsilon = 1e-9);
}

#[test]
fn stepping_without_clock_or_data_finishes() {
    let t0 = Instant::now();
    let mut empty = CandleStore::new(INTERVAL).expect("store");
    let mut line = line();
    assert_eq!(line.step(t0, &mut empty), StepOutcome::Done);

    line.observe(0, t0);
    assert_eq!(line.step(t0, &mut empty), StepOutcome::Done);
    assert_eq!(line.displayed_index(), None);
}

#[test]
fn clear_drops_anchor_and_reset_keeps_it() {
    let t0 = Instant::now();
    let mut store = store(10, 0);
    let mut line = line();
    line.observe(INTERVAL, t0);
    line.step(t0, &mut store);

    line.reset();
    assert!(line.anchor().is_some());
    assert_eq!(line.displayed_index(), None);

    line.clear();
    assert!(line.anchor().is_none());
    assert_eq!(line.estimate(t0), None);
}
