//! # Wire Helpers
//!
//! The table API is schemaless: a field that the UI always wrote as a number may come
//! back as a string, lists may be `null`, and timestamps show up either as epoch
//! milliseconds or as RFC 3339 strings. These helpers keep that leniency at the serde
//! boundary so the rest of the crate works with plain, well-typed values.
//!
//! | Helper | Accepts | Produces |
//! |--------|---------|----------|
//! | [`null_as_default`] | value or `null` | `T::default()` for `null` |
//! | [`rating`] | number, numeric string, `null` | `u8` clamped to 0..=5 |
//! | [`count`] | number, numeric string, `null` | `u64` (negatives become 0) |
//! | [`price`] | number, numeric string, `null`, `""` | `Option<f64>` |
//! | [`timestamp`] | epoch millis, RFC 3339, `null` | `Option<DateTime<Utc>>` |
//! | [`date`] | `YYYY-MM-DD`, RFC 3339, epoch millis, `null`, `""` | `Option<NaiveDate>` |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub fn rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_f64(&value)
        .filter(|n| n.is_finite())
        .map(|n| n.floor().clamp(0.0, 5.0) as u8)
        .unwrap_or(0))
}

pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_f64(&value)
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n as u64)
        .unwrap_or(0))
}

pub fn price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_f64(&value).filter(|n| n.is_finite()))
}

/// Epoch-millisecond timestamps (the table API's native format).
pub mod timestamp {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_i64(ts.timestamp_millis()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(parse(&value))
    }

    pub(crate) fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .ok(),
            _ => None,
        }
    }
}

/// Calendar dates, written as `YYYY-MM-DD`.
pub mod date {
    use super::*;
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match &value {
            Value::String(s) => parse_str(s),
            Value::Number(_) => timestamp::parse(&value).map(|ts| ts.date_naive()),
            _ => None,
        })
    }

    /// Parses a plain date or the date part of an RFC 3339 timestamp (in UTC).
    pub fn parse_str(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, FORMAT).ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
    }
}
