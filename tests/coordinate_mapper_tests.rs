use live_chart::core::coordinate::{
    index_to_pixel_x, index_to_time, pixel_to_time_price, pixel_x_to_index, pixel_y_to_price,
    price_to_pixel_y, time_to_index, time_to_pixel_x,
};
use live_chart::core::{Candle, Surface, Viewport};

const SURFACE: Surface = Surface::new(1000.0, 500.0);

fn irregular_series() -> Vec<Candle> {
    [0_i64, 60_000, 120_000, 300_000, 360_000]
        .into_iter()
        .map(|t| Candle::flat(t, 100.0))
        .collect()
}

#[test]
fn index_axis_maps_window_onto_surface_width() {
    let viewport = Viewport::new(10.0, 100.0, 90.0, 110.0);
    assert!((index_to_pixel_x(&viewport, SURFACE, 10.0)).abs() <= 1e-9);
    assert!((index_to_pixel_x(&viewport, SURFACE, 110.0) - 1000.0).abs() <= 1e-9);
    assert!((index_to_pixel_x(&viewport, SURFACE, 60.0) - 500.0).abs() <= 1e-9);
    assert!((pixel_x_to_index(&viewport, SURFACE, 250.0) - 35.0).abs() <= 1e-9);
}

#[test]
fn price_axis_is_inverted_and_clamped() {
    let viewport = Viewport::new(0.0, 100.0, 90.0, 110.0);
    assert!((price_to_pixel_y(&viewport, SURFACE, 110.0)).abs() <= 1e-9);
    assert!((price_to_pixel_y(&viewport, SURFACE, 90.0) - 500.0).abs() <= 1e-9);
    assert!((price_to_pixel_y(&viewport, SURFACE, 100.0) - 250.0).abs() <= 1e-9);
    assert_eq!(price_to_pixel_y(&viewport, SURFACE, 500.0), 0.0);
    assert_eq!(price_to_pixel_y(&viewport, SURFACE, 1.0), 500.0);

    let price = pixel_y_to_price(&viewport, SURFACE, 125.0).expect("price");
    assert!((price - 105.0).abs() <= 1e-9);
}

#[test]
fn degenerate_price_range_maps_to_vertical_middle() {
    let flat = Viewport::new(0.0, 100.0, 100.0, 100.0);
    assert_eq!(price_to_pixel_y(&flat, SURFACE, 100.0), 250.0);
    assert_eq!(pixel_y_to_price(&flat, SURFACE, 10.0), None);

    let uninitialized = Viewport::new(0.0, 100.0, f64::NAN, f64::NAN);
    assert_eq!(price_to_pixel_y(&uninitialized, SURFACE, 42.0), 250.0);
}

#[test]
fn time_interpolates_between_irregular_bars() {
    let candles = irregular_series();
    assert_eq!(index_to_time(&candles, 60_000, 2.5), Some(210_000.0));
    assert_eq!(time_to_index(&candles, 60_000, 210_000.0), Some(2.5));
    assert_eq!(time_to_index(&candles, 60_000, 300_000.0), Some(3.0));
}

#[test]
fn time_extrapolates_with_neighbouring_interval() {
    let candles = irregular_series();
    assert_eq!(index_to_time(&candles, 60_000, -2.0), Some(-120_000.0));
    assert_eq!(index_to_time(&candles, 60_000, 6.0), Some(480_000.0));
    assert_eq!(time_to_index(&candles, 60_000, 390_000.0), Some(4.5));
    assert_eq!(time_to_index(&candles, 60_000, -30_000.0), Some(-0.5));
}

#[test]
fn single_bar_uses_configured_interval() {
    let candles = [Candle::flat(1_000_000, 100.0)];
    assert_eq!(index_to_time(&candles, 60_000, 1.5), Some(1_090_000.0));
    assert_eq!(time_to_index(&candles, 60_000, 970_000.0), Some(-0.5));
}

#[test]
fn empty_series_has_no_time_mapping() {
    assert_eq!(index_to_time(&[], 60_000, 1.0), None);
    assert_eq!(time_to_index(&[], 60_000, 1.0), None);
    let viewport = Viewport::new(0.0, 100.0, 90.0, 110.0);
    assert_eq!(time_to_pixel_x(&viewport, SURFACE, &[], 60_000, 0.0), None);
    assert_eq!(
        pixel_to_time_price(&viewport, SURFACE, &[], 60_000, 10.0, 10.0),
        None
    );
}

#[test]
fn pixel_to_time_price_resolves_both_axes() {
    let candles = irregular_series();
    let viewport = Viewport::new(0.0, 4.0, 90.0, 110.0);
    let point =
        pixel_to_time_price(&viewport, SURFACE, &candles, 60_000, 625.0, 250.0).expect("point");
    assert!((point.time - 210_000.0).abs() <= 1e-6);
    assert!((point.price - 100.0).abs() <= 1e-9);

    let x = time_to_pixel_x(&viewport, SURFACE, &candles, 60_000, 210_000.0).expect("x");
    assert!((x - 625.0).abs() <= 1e-9);
    assert_eq!(
        pixel_to_time_price(&viewport, SURFACE, &candles, 60_000, f64::INFINITY, 1.0),
        None
    );
}
