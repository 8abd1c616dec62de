//! JSON embedded in plain-text bodies.
//!
//! Two dialects exist: DYFI reports wrap the object in marker lines, ETO
//! messages just put an object somewhere in the body.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DYFI_BEGIN_MARKER: &str = "--- BEGIN json ---";
pub const DYFI_END_MARKER: &str = "--- END json ---";

/// Text strictly between `begin` and the next `end` after it.
///
/// On failure returns the marker that was missing.
pub fn between_markers<'a>(text: &'a str, begin: &'a str, end: &'a str) -> Result<&'a str, &'a str> {
    let start = text.find(begin).ok_or(begin)? + begin.len();
    let len = text[start..].find(end).ok_or(end)?;
    Ok(text[start..start + len].trim())
}

/// Text from the first `{` through the last `}`.
pub fn braced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn from_block<T: DeserializeOwned>(block: &str) -> serde_json::Result<T> {
    serde_json::from_str(block)
}

/// Field deserializer for free-text values: `null` reads as `""`, numbers
/// and booleans as their JSON text. Arrays and objects are still errors.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(other) => Err(D::Error::custom(format!("expected text, found {other}"))),
    }
}
