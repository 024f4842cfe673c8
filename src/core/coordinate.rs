//! Pure mapping between chart space (time, bar index, price) and pixels.
//!
//! The horizontal axis is bar index, not wall time: gaps in the feed do not
//! produce gaps on screen. Time is recovered from index by interpolating
//! between neighbouring bars and extrapolating past either end with the
//! nearest observed interval.

use crate::core::{Candle, Surface, TimePrice, Viewport};

/// Maps a fractional bar index to an x pixel.
#[must_use]
pub fn index_to_pixel_x(viewport: &Viewport, surface: Surface, index: f64) -> f64 {
    match viewport.index_scale() {
        Ok(scale) => scale.domain_to_pixel(index, surface.width),
        Err(_) => surface.width / 2.0,
    }
}

#[must_use]
pub fn pixel_x_to_index(viewport: &Viewport, surface: Surface, x: f64) -> f64 {
    match viewport.index_scale() {
        Ok(scale) => scale.pixel_to_domain(x, surface.width),
        Err(_) => viewport.center_index,
    }
}

/// Maps a price to a y pixel, clamped to `[0, height]`.
///
/// A degenerate or uninitialized price range maps everything to the
/// vertical middle.
#[must_use]
pub fn price_to_pixel_y(viewport: &Viewport, surface: Surface, price: f64) -> f64 {
    if !viewport.has_price_range() {
        return surface.height / 2.0;
    }
    match viewport.price_scale() {
        Ok(scale) => {
            let y = surface.height - scale.domain_to_pixel(price, surface.height);
            y.clamp(0.0, surface.height)
        }
        Err(_) => surface.height / 2.0,
    }
}

#[must_use]
pub fn pixel_y_to_price(viewport: &Viewport, surface: Surface, y: f64) -> Option<f64> {
    if !viewport.has_price_range() || !surface.is_valid() {
        return None;
    }
    let scale = viewport.price_scale().ok()?;
    Some(scale.pixel_to_domain(surface.height - y, surface.height))
}

/// Resolves a fractional index to epoch milliseconds.
///
/// A single-bar series extrapolates with `interval_ms`.
#[must_use]
pub fn index_to_time(candles: &[Candle], interval_ms: i64, index: f64) -> Option<f64> {
    if !index.is_finite() {
        return None;
    }
    let first = candles.first()?;
    let t0 = first.open_time as f64;
    let n = candles.len();
    if n == 1 {
        return Some(t0 + index * interval_ms as f64);
    }

    let last_index = (n - 1) as f64;
    if index <= 0.0 {
        let step = (candles[1].open_time - first.open_time) as f64;
        return Some(t0 + index * step);
    }
    if index >= last_index {
        let last = candles[n - 1].open_time as f64;
        let step = (candles[n - 1].open_time - candles[n - 2].open_time) as f64;
        return Some(last + (index - last_index) * step);
    }

    let i = index.floor() as usize;
    let frac = index - i as f64;
    let left = candles[i].open_time as f64;
    let right = candles[i + 1].open_time as f64;
    Some(left + frac * (right - left))
}

/// Inverse of [`index_to_time`]: binary search inside the series,
/// extrapolation outside it.
#[must_use]
pub fn time_to_index(candles: &[Candle], interval_ms: i64, time: f64) -> Option<f64> {
    if !time.is_finite() {
        return None;
    }
    let first = candles.first()?;
    let t0 = first.open_time as f64;
    let n = candles.len();
    if n == 1 {
        if interval_ms <= 0 {
            return Some(0.0);
        }
        return Some((time - t0) / interval_ms as f64);
    }

    if time <= t0 {
        let step = (candles[1].open_time - first.open_time) as f64;
        return Some((time - t0) / step);
    }
    let last = candles[n - 1].open_time as f64;
    if time >= last {
        let step = (candles[n - 1].open_time - candles[n - 2].open_time) as f64;
        return Some((n - 1) as f64 + (time - last) / step);
    }

    let upper = candles.partition_point(|candle| (candle.open_time as f64) <= time);
    let i = upper - 1;
    let left = candles[i].open_time as f64;
    let right = candles[i + 1].open_time as f64;
    Some(i as f64 + (time - left) / (right - left))
}

#[must_use]
pub fn time_to_pixel_x(
    viewport: &Viewport,
    surface: Surface,
    candles: &[Candle],
    interval_ms: i64,
    time: f64,
) -> Option<f64> {
    let index = time_to_index(candles, interval_ms, time)?;
    Some(index_to_pixel_x(viewport, surface, index))
}

/// Resolves a pixel position to `(time, price)`; `None` without data or
/// without a usable price range.
#[must_use]
pub fn pixel_to_time_price(
    viewport: &Viewport,
    surface: Surface,
    candles: &[Candle],
    interval_ms: i64,
    x: f64,
    y: f64,
) -> Option<TimePrice> {
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    let index = pixel_x_to_index(viewport, surface, x);
    let time = index_to_time(candles, interval_ms, index)?;
    let price = pixel_y_to_price(viewport, surface, y)?;
    Some(TimePrice::new(time, price))
}
