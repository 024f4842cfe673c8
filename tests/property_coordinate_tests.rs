use live_chart::core::coordinate::{
    index_to_pixel_x, index_to_time, pixel_x_to_index, pixel_y_to_price, price_to_pixel_y,
    time_to_index,
};
use live_chart::core::{Candle, Surface, Viewport};
use proptest::prelude::*;

proptest! {
    #[test]
    fn index_pixel_round_trip(
        from_index in -1_000.0f64..10_000.0,
        bars in 10.0f64..400.0,
        index_factor in 0.0f64..1.0
    ) {
        let viewport = Viewport::new(from_index, bars, 1.0, 2.0);
        let surface = Surface::new(1_920.0, 1_080.0);
        let index = from_index + index_factor * bars;

        let x = index_to_pixel_x(&viewport, surface, index);
        let recovered = pixel_x_to_index(&viewport, surface, x);
        prop_assert!((recovered - index).abs() <= 1e-7);
    }

    #[test]
    fn price_pixel_round_trip_inside_range(
        min_price in 0.001f64..100_000.0,
        span in 0.001f64..100_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let viewport = Viewport::new(0.0, 100.0, min_price, min_price + span);
        let surface = Surface::new(1_024.0, 768.0);
        let price = min_price + value_factor * span;

        let y = price_to_pixel_y(&viewport, surface, price);
        prop_assert!((0.0..=768.0).contains(&y));
        let recovered = pixel_y_to_price(&viewport, surface, y).expect("price");
        prop_assert!((recovered - price).abs() <= span * 1e-9);
    }

    #[test]
    fn time_index_round_trip_on_irregular_series(
        gaps in prop::collection::vec(1i64..10, 2..60),
        index_factor in -0.5f64..1.5
    ) {
        let mut open_time = 1_000_000_i64;
        let candles: Vec<Candle> = gaps
            .iter()
            .map(|gap| {
                open_time += gap * 60_000;
                Candle::flat(open_time, 100.0)
            })
            .collect();
        let index = index_factor * (candles.len() - 1) as f64;

        let time = index_to_time(&candles, 60_000, index).expect("time");
        let recovered = time_to_index(&candles, 60_000, time).expect("index");
        prop_assert!((recovered - index).abs() <= 1e-6);
    }

    #[test]
    fn time_to_index_is_monotonic(
        gaps in prop::collection::vec(1i64..10, 2..40),
        a in 0.0f64..1.0,
        b in 0.0f64..1.0
    ) {
        let mut open_time = 0_i64;
        let candles: Vec<Candle> = gaps
            .iter()
            .map(|gap| {
                open_time += gap * 60_000;
                Candle::flat(open_time, 1.0)
            })
            .collect();
        let span = (open_time + 120_000) as f64;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        let lo_index = time_to_index(&candles, 60_000, lo * span).expect("index");
        let hi_index = time_to_index(&candles, 60_000, hi * span).expect("index");
        prop_assert!(lo_index <= hi_index + 1e-12);
    }
}
