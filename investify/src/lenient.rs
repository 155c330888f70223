//! Field deserializers that never fail
//!
//! A reply that passes the shape check can still carry a `null`, an unknown
//! level token or a float where a count belongs. These helpers accept any JSON
//! value and fall back to the field's documented default when it does not fit,
//! so one odd field never discards the rest of the reply.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::CategoryScore;

const DEFAULT_HORIZON_YEARS: f64 = 5.0;

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_or<'de, D>(deserializer: D, fallback: f64) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value).unwrap_or(fallback))
}

/// Any number, else 0
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    number_or(deserializer, 0.0)
}

/// Any number, else 0.5; range is enforced later by clamping
pub fn confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    number_or(deserializer, CategoryScore::DEFAULT_CONFIDENCE)
}

/// Any number, else 50
pub fn score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    number_or(deserializer, CategoryScore::DEFAULT_SCORE)
}

pub fn horizon_years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    number_or(deserializer, DEFAULT_HORIZON_YEARS)
}

/// Non-negative count; fractions round to the nearest integer
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let count = as_number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0);
    Ok(count)
}

/// String items of an array; anything else is dropped
pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(items)
}

pub fn assessment<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(CategoryScore::DEFAULT_ASSESSMENT.to_string()),
    }
}

/// Typed decode of the value, else `T::default()`
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
