use std::time::Instant;

use chrono::{TimeZone, Utc};
use live_chart::api::{ChartEngine, ChartEngineConfig, UpsertOutcome};
use live_chart::core::{Candle, FeedCandle};
use live_chart::render::NullRenderer;
use rust_decimal::Decimal;

const INTERVAL: i64 = 60_000;

fn engine() -> ChartEngine<NullRenderer> {
    ChartEngine::new(NullRenderer::default(), ChartEngineConfig::new(INTERVAL))
        .expect("engine init")
}

#[test]
fn feed_candle_parses_camel_case_object() {
    let feed = FeedCandle::from_json_str(
        r#"{"openTime":1000000,"open":"100.5","high":"101","low":"99.75","close":"100"}"#,
    )
    .expect("single object");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].open_time, 1_000_000);

    let candle = feed[0].to_candle().expect("valid candle");
    assert_eq!(candle, Candle::new(1_000_000, 100.5, 101.0, 99.75, 100.0));
}

#[test]
fn feed_candle_rejects_bad_prices() {
    let feed = FeedCandle {
        open_time: 0,
        open: "1".to_owned(),
        high: "abc".to_owned(),
        low: "1".to_owned(),
        close: "1".to_owned(),
    };
    assert!(feed.to_candle().is_err());

    let inverted = FeedCandle {
        open_time: 0,
        open: "1".to_owned(),
        high: "0.5".to_owned(),
        low: "2".to_owned(),
        close: "1".to_owned(),
    };
    assert!(inverted.to_candle().is_err());
}

#[test]
fn engine_ingests_array_payload_in_order() {
    let mut engine = engine();
    let payload = r#"[
        {"openTime":1000000,"open":"100","high":"101","low":"99","close":"100.5"},
        {"openTime":1060000,"open":"100.5","high":"102","low":"100","close":"101.5"}
    ]"#;
    let outcomes = engine
        .ingest_feed_json(payload, Instant::now())
        .expect("payload");
    assert_eq!(
        outcomes,
        vec![
            UpsertOutcome::Appended { index: 0 },
            UpsertOutcome::Appended { index: 1 },
        ]
    );
    assert_eq!(engine.candles().len(), 2);
    assert!(engine.viewport().is_some());
}

#[test]
fn malformed_payload_is_an_error_and_leaves_series_untouched() {
    let mut engine = engine();
    assert!(engine.ingest_feed_json("{not json", Instant::now()).is_err());
    assert!(
        engine
            .ingest_feed_json(r#"{"openTime":"x"}"#, Instant::now())
            .is_err()
    );
    assert!(engine.candles().is_empty());
}

#[test]
fn invalid_bar_inside_valid_payload_is_rejected_individually() {
    let mut engine = engine();
    let payload = r#"[
        {"openTime":1000000,"open":"100","high":"101","low":"99","close":"100"},
        {"openTime":1060000,"open":"100","high":"nope","low":"99","close":"100"},
        {"openTime":1120000,"open":"100","high":"101","low":"99","close":"100"}
    ]"#;
    let outcomes = engine
        .ingest_feed_json(payload, Instant::now())
        .expect("payload");
    assert_eq!(
        outcomes,
        vec![
            UpsertOutcome::Appended { index: 0 },
            UpsertOutcome::Rejected,
            UpsertOutcome::Appended { index: 1 },
        ]
    );
}

#[test]
fn decimal_time_constructor_validates() {
    let open_time = Utc.timestamp_millis_opt(1_700_000_040_000).single().expect("time");
    let candle = Candle::from_decimal_time(
        open_time,
        Decimal::new(10_050, 2),
        Decimal::new(10_100, 2),
        Decimal::new(9_975, 2),
        Decimal::new(10_000, 2),
    )
    .expect("valid candle");
    assert_eq!(candle.open_time, 1_700_000_040_000);
    assert!((candle.open - 100.5).abs() <= 1e-9);
    assert!(!candle.is_bullish());

    assert!(
        Candle::from_decimal_time(
            open_time,
            Decimal::ONE,
            Decimal::ZERO,
            Decimal::ONE,
            Decimal::ONE
        )
        .is_err()
    );
}
