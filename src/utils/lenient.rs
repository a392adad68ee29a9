//! Lenient field deserializers for API payloads.
//!
//! Listings are created from web forms, so numbers frequently arrive as
//! strings and ids arrive either as plain strings or as `{"$oid": "..."}`.
//! These helpers accept those variants and enforce the numeric invariants of
//! the data model (non-negative stock and price, rating within `[0, 5]`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::constants::RATING_MAX;
use crate::utils::datetime;

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Entity id: string, number or `{"$oid": "..."}`
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", value)))
}

pub(crate) fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Rating clamped to `[0, 5]`; unparseable values become 0
pub fn rating<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(clamp_rating(as_f64(&value).unwrap_or(0.0)))
}

pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return 0.0;
    }
    rating.clamp(0.0, RATING_MAX)
}

/// Non-negative amount; negative values saturate to 0
pub fn non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match as_f64(&value) {
        Some(amount) if amount.is_finite() => Ok(amount.max(0.0)),
        Some(_) => Err(serde::de::Error::custom("amount is not finite")),
        None if value.is_null() => Ok(0.0),
        None => Err(serde::de::Error::custom(format!("invalid amount: {}", value))),
    }
}

/// Unit count; negative values saturate to 0, fractions are truncated
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match as_f64(&value) {
        Some(count) if count.is_finite() => Ok(count.max(0.0).min(u32::MAX as f64) as u32),
        Some(_) => Err(serde::de::Error::custom("quantity is not finite")),
        None if value.is_null() => Ok(0),
        None => Err(serde::de::Error::custom(format!("invalid quantity: {}", value))),
    }
}

/// Optional small count (seats, doors, year); garbage becomes `None`
pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_f64(&value).filter(|n| n.is_finite() && *n >= 0.0).map(|n| n as u32))
}

/// Optional free text; numbers are stringified, blanks become `None`
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Optional timestamp in any format [`datetime::parse_timestamp`] accepts
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<chrono::DateTime<chrono::Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => datetime::parse_timestamp(&s),
        Value::Object(map) => map.get("$date").and_then(Value::as_str).and_then(datetime::parse_timestamp),
        _ => None,
    })
}
