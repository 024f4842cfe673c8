use std::time::Instant;

use live_chart::api::{ChartEngine, ChartEngineConfig, InteractionMode, PointerAction};
use live_chart::core::{Candle, TimePrice};
use live_chart::interaction::{InteractionState, PointerPhase, dispatch_pointer};
use live_chart::render::NullRenderer;

const BASE: i64 = 1_000_000;
const INTERVAL: i64 = 60_000;

fn series(count: i64) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::flat(BASE + i * INTERVAL, 100.0))
        .collect()
}

fn resolve_identity(x: f64, y: f64) -> Option<TimePrice> {
    Some(TimePrice { time: x, price: y })
}

#[test]
fn pan_mode_tracks_drag_deltas() {
    let mut state = InteractionState::default();
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Move, 5.0, 5.0, resolve_identity),
        PointerAction::Hover { x: 5.0, y: 5.0 }
    );
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Down, 100.0, 5.0, resolve_identity),
        PointerAction::DragStart
    );
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Move, 130.0, 5.0, resolve_identity),
        PointerAction::Pan { delta_x: 30.0 }
    );
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Move, 120.0, 5.0, resolve_identity),
        PointerAction::Pan { delta_x: -10.0 }
    );
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Up, 120.0, 5.0, resolve_identity),
        PointerAction::DragEnd
    );
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Up, 120.0, 5.0, resolve_identity),
        PointerAction::Ignored
    );
}

#[test]
fn leaving_while_pressed_ends_the_drag() {
    let mut state = InteractionState::default();
    dispatch_pointer(&mut state, PointerPhase::Down, 1.0, 1.0, resolve_identity);
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Leave, 1.0, 1.0, resolve_identity),
        PointerAction::DragEnd
    );
    assert!(!state.is_pressed());
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Leave, 1.0, 1.0, resolve_identity),
        PointerAction::HoverCleared
    );
}

#[test]
fn non_finite_coordinates_are_ignored() {
    let mut state = InteractionState::default();
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Down, f64::NAN, 1.0, resolve_identity),
        PointerAction::Ignored
    );
    assert!(!state.is_pressed());
}

#[test]
fn draw_mode_forwards_resolved_points_while_pressed() {
    let mut state = InteractionState::default();
    state.set_mode(InteractionMode::Draw);

    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Move, 3.0, 4.0, resolve_identity),
        PointerAction::Hover { x: 3.0, y: 4.0 }
    );
    let point = TimePrice {
        time: 10.0,
        price: 20.0,
    };
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Down, 10.0, 20.0, resolve_identity),
        PointerAction::Annotation {
            mode: InteractionMode::Draw,
            phase: PointerPhase::Down,
            point,
        }
    );
    assert!(matches!(
        dispatch_pointer(&mut state, PointerPhase::Move, 11.0, 21.0, resolve_identity),
        PointerAction::Annotation {
            phase: PointerPhase::Move,
            ..
        }
    ));
    assert!(matches!(
        dispatch_pointer(&mut state, PointerPhase::Up, 11.0, 21.0, resolve_identity),
        PointerAction::Annotation {
            phase: PointerPhase::Up,
            ..
        }
    ));
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Up, 11.0, 21.0, resolve_identity),
        PointerAction::Ignored
    );
}

#[test]
fn erase_mode_ignores_unresolvable_points_and_mode_switch_drops_press() {
    let mut state = InteractionState::default();
    state.set_mode(InteractionMode::Erase);
    assert_eq!(
        dispatch_pointer(&mut state, PointerPhase::Down, 1.0, 1.0, |_, _| None),
        PointerAction::Ignored
    );
    assert!(state.is_pressed());
    state.set_mode(InteractionMode::Pan);
    assert!(!state.is_pressed());
    assert_eq!(state.mode(), InteractionMode::Pan);
}

#[test]
fn engine_draw_mode_resolves_chart_coordinates() {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartEngineConfig::new(INTERVAL))
        .expect("engine init");
    engine.set_interaction_mode(InteractionMode::Draw);
    let now = Instant::now();
    assert_eq!(engine.pointer_down(400.0, 200.0, now), PointerAction::Ignored);
    engine.pointer_up(400.0, 200.0, now);

    engine.set_candles(series(200));
    let from_before = engine.viewport().expect("viewport").from_index;
    let PointerAction::Annotation { mode, phase, point } = engine.pointer_down(400.0, 200.0, now)
    else {
        panic!("draw input must resolve to an annotation");
    };
    assert_eq!(mode, InteractionMode::Draw);
    assert_eq!(phase, PointerPhase::Down);
    assert!((point.time - (BASE as f64 + 154.5 * INTERVAL as f64)).abs() <= 1e-6);
    assert!((point.price - 100.0).abs() <= 1e-9);

    engine.pointer_move(300.0, 200.0, now);
    let from_after = engine.viewport().expect("viewport").from_index;
    assert!((from_after - from_before).abs() <= 1e-12);
}

#[test]
fn engine_hover_snaps_to_nearest_bar_and_leave_clears() {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartEngineConfig::new(INTERVAL))
        .expect("engine init");
    engine.set_candles(series(200));
    let now = Instant::now();

    assert_eq!(
        engine.pointer_move(404.0, 200.0, now),
        PointerAction::Hover { x: 404.0, y: 200.0 }
    );
    let hover = engine.hover();
    assert!(hover.visible);
    assert_eq!(hover.nearest_index, Some(155));
    assert_eq!(hover.time, Some((BASE + 155 * INTERVAL) as f64));
    assert!((hover.price.expect("price") - 100.0).abs() <= 1e-9);

    assert_eq!(engine.pointer_leave(now), PointerAction::HoverCleared);
    assert!(!engine.hover().visible);
    assert_eq!(engine.hover().nearest_index, None);
}

#[test]
fn hover_past_last_bar_clamps_to_tail() {
    let mut engine = ChartEngine::new(NullRenderer::default(), ChartEngineConfig::new(INTERVAL))
        .expect("engine init");
    engine.set_candles(series(200));
    engine.pointer_move(799.0, 10.0, Instant::now());
    assert_eq!(engine.hover().nearest_index, Some(199));
}
