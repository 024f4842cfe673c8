use live_chart::core::{Candle, CandleStore, UpsertOutcome};
use proptest::prelude::*;

const INTERVAL: i64 = 60_000;

fn candle() -> impl Strategy<Value = Candle> {
    (0i64..200, 0i64..INTERVAL, 1.0f64..1_000.0, 0.0f64..10.0, 0.0f64..10.0, any::<bool>())
        .prop_map(|(slot, offset, base, up, down, bullish)| {
            let (open, close) = if bullish { (base, base + up) } else { (base + up, base) };
            Candle::new(
                slot * INTERVAL + offset,
                open,
                open.max(close) + down,
                (open.min(close) - down).max(0.5),
                close,
            )
        })
}

proptest! {
    #[test]
    fn upserts_keep_series_ordered_and_unique(
        updates in prop::collection::vec(candle(), 1..200)
    ) {
        let mut store = CandleStore::new(INTERVAL).expect("store");
        for candle in updates {
            let len_before = store.len();
            let outcome = store.upsert(candle);
            prop_assert!(store.len() >= len_before);
            if let UpsertOutcome::Appended { index } = outcome {
                prop_assert_eq!(store.len(), len_before + 1);
                prop_assert_eq!(store.candles()[index].open_time, candle.open_time);
            }
            prop_assert!(store.is_ordered());
            prop_assert!(store.candles().iter().all(Candle::is_valid));
        }
    }

    #[test]
    fn prepend_and_reset_restore_ordering(
        initial in prop::collection::vec(candle(), 0..100),
        history in prop::collection::vec(candle(), 0..100)
    ) {
        let mut store = CandleStore::new(INTERVAL).expect("store");
        store.reset(initial);
        prop_assert!(store.is_ordered());

        let first_before = store.first().map(|c| c.open_time);
        let len_before = store.len();
        let inserted = store.prepend(history);
        prop_assert_eq!(store.len(), len_before + inserted);
        prop_assert!(store.is_ordered());
        if let (Some(first), true) = (first_before, inserted > 0) {
            prop_assert!(store.candles()[inserted - 1].open_time < first);
            prop_assert_eq!(store.candles()[inserted].open_time, first);
        }
    }
}
