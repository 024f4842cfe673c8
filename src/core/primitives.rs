use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Parses a string-encoded decimal as delivered by feed payloads.
///
/// Accepts plain (`"101.25"`) and scientific (`"1.0125e2"`) notation.
pub fn parse_decimal_str(raw: &str, field_name: &str) -> ChartResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChartError::InvalidData(format!("{field_name} is empty")));
    }
    let decimal = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| ChartError::InvalidData(format!("{field_name} is not a decimal: {e}")))?;
    decimal_to_f64(decimal, field_name)
}

#[must_use]
pub fn datetime_to_unix_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Converts epoch milliseconds back to a UTC datetime, `None` when out of
/// chrono's representable range.
#[must_use]
pub fn unix_millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::{parse_decimal_str, unix_millis_to_datetime};

    #[test]
    fn parses_plain_and_scientific_decimals() {
        assert!((parse_decimal_str("101.25", "close").expect("plain") - 101.25).abs() < 1e-12);
        assert!((parse_decimal_str(" 1.0125e2 ", "close").expect("sci") - 101.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_garbage_decimals() {
        assert!(parse_decimal_str("", "open").is_err());
        assert!(parse_decimal_str("abc", "open").is_err());
    }

    #[test]
    fn millis_round_trip_through_datetime() {
        let dt = unix_millis_to_datetime(1_700_000_000_123).expect("in range");
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);
    }
}
