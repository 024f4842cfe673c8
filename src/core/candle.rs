use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::coordinate::{index_to_pixel_x, price_to_pixel_y};
use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64, parse_decimal_str};
use crate::core::{Surface, Viewport};
use crate::error::{ChartError, ChartResult};

/// One OHLC bar keyed by its open time in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Builds a candle without validation. Use [`Candle::validate`] or
    /// [`Candle::checked`] before handing untrusted input to a store.
    #[must_use]
    pub const fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
        }
    }

    /// Builds a flat bar where all four prices equal `price`.
    #[must_use]
    pub const fn flat(open_time: i64, price: f64) -> Self {
        Self::new(open_time, price, price, price, price)
    }

    pub fn checked(
        open_time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> ChartResult<Self> {
        let candle = Self::new(open_time, open, high, low, close);
        candle.validate()?;
        Ok(candle)
    }

    /// Invariants:
    /// - all prices are finite and > 0
    /// - `high >= max(open, close, low)`
    /// - `low <= min(open, close, high)`
    pub fn validate(&self) -> ChartResult<()> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(ChartError::InvalidData(format!("{field} must be finite")));
            }
            if value <= 0.0 {
                return Err(ChartError::InvalidData(format!("{field} must be > 0")));
            }
        }

        if self.low > self.high {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }
        if self.open < self.low
            || self.open > self.high
            || self.close < self.low
            || self.close > self.high
        {
            return Err(ChartError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// A flat bar (`open == high == low == close`) is how feeds emit
    /// placeholders for intervals with no trades yet.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.open == self.close && self.open == self.high && self.open == self.low
    }

    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Converts strongly-typed temporal/decimal input into a validated candle.
    pub fn from_decimal_time(
        open_time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> ChartResult<Self> {
        Self::checked(
            datetime_to_unix_millis(open_time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
        )
    }
}

/// Wire shape of one bar as delivered by the quote feed.
///
/// Prices arrive as string-encoded decimals and must be parsed before they
/// reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCandle {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedPayload {
    One(FeedCandle),
    Many(Vec<FeedCandle>),
}

impl FeedCandle {
    /// Parses the decimal strings and validates the result.
    pub fn to_candle(&self) -> ChartResult<Candle> {
        Candle::checked(
            self.open_time,
            parse_decimal_str(&self.open, "open")?,
            parse_decimal_str(&self.high, "high")?,
            parse_decimal_str(&self.low, "low")?,
            parse_decimal_str(&self.close, "close")?,
        )
    }

    /// Accepts either a single JSON object or an array of objects.
    pub fn from_json_str(input: &str) -> ChartResult<Vec<Self>> {
        let payload: FeedPayload = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse feed payload: {e}")))?;
        Ok(match payload {
            FeedPayload::One(candle) => vec![candle],
            FeedPayload::Many(candles) => candles,
        })
    }
}

/// Projected candle geometry in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub index: usize,
    pub center_x: f64,
    pub body_left: f64,
    pub body_right: f64,
    pub body_top: f64,
    pub body_bottom: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub is_bullish: bool,
}

/// Projects a contiguous run of candles into render geometry.
///
/// `first_index` is the series index of `candles[0]`.
pub fn project_candles(
    candles: &[Candle],
    first_index: usize,
    viewport: &Viewport,
    surface: Surface,
    body_width_px: f64,
) -> ChartResult<Vec<CandleGeometry>> {
    if !body_width_px.is_finite() || body_width_px <= 0.0 {
        return Err(ChartError::InvalidData(
            "body width must be finite and > 0".to_owned(),
        ));
    }
    if !surface.is_valid() {
        return Err(ChartError::InvalidSurface {
            width: surface.width,
            height: surface.height,
        });
    }

    #[cfg(feature = "parallel-projection")]
    {
        Ok(candles
            .par_iter()
            .enumerate()
            .map(|(offset, candle)| {
                project_single_candle(
                    *candle,
                    first_index + offset,
                    viewport,
                    surface,
                    body_width_px,
                )
            })
            .collect())
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        Ok(candles
            .iter()
            .enumerate()
            .map(|(offset, candle)| {
                project_single_candle(
                    *candle,
                    first_index + offset,
                    viewport,
                    surface,
                    body_width_px,
                )
            })
            .collect())
    }
}

fn project_single_candle(
    candle: Candle,
    index: usize,
    viewport: &Viewport,
    surface: Surface,
    body_width_px: f64,
) -> CandleGeometry {
    let half = body_width_px / 2.0;
    let center_x = index_to_pixel_x(viewport, surface, index as f64);
    let open_y = price_to_pixel_y(viewport, surface, candle.open);
    let close_y = price_to_pixel_y(viewport, surface, candle.close);

    CandleGeometry {
        index,
        center_x,
        body_left: center_x - half,
        body_right: center_x + half,
        body_top: open_y.min(close_y),
        body_bottom: open_y.max(close_y),
        wick_top: price_to_pixel_y(viewport, surface, candle.high),
        wick_bottom: price_to_pixel_y(viewport, surface, candle.low),
        is_bullish: candle.is_bullish(),
    }
}
