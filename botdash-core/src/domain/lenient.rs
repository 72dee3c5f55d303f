//! Tolerant field decoding for bot-produced JSON.
//!
//! The upstream bot is not strict about types: prices show up as numbers,
//! numeric strings, or `null` depending on the code path that wrote them.
//! These helpers turn anything unusable into `None` instead of failing the
//! whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a number, a numeric string, or anything else (as `None`).
///
/// Non-finite values (`"NaN"`, `"inf"`) are treated as missing.
pub(crate) fn f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

/// Decode a string; numbers are stringified, everything else is `None`.
pub(crate) fn string_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
