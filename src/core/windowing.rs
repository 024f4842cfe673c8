use ordered_float::OrderedFloat;

use crate::core::Candle;

/// Lowest low and highest high of `candles`, widened by any finite positive
/// marker prices. `None` when nothing contributes.
#[must_use]
pub fn visible_price_extent(candles: &[Candle], marker_prices: &[f64]) -> Option<(f64, f64)> {
    let lows = candles.iter().map(|candle| candle.low);
    let highs = candles.iter().map(|candle| candle.high);
    let markers = marker_prices
        .iter()
        .copied()
        .filter(|price| price.is_finite() && *price > 0.0);

    let min = lows
        .chain(markers.clone())
        .filter(|value| value.is_finite())
        .map(OrderedFloat)
        .min()?;
    let max = highs
        .chain(markers)
        .filter(|value| value.is_finite())
        .map(OrderedFloat)
        .max()?;
    Some((min.0, max.0))
}
