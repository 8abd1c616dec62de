//! Stateless extraction primitives shared by every form parser.
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod datetime;
pub mod formdata;
pub mod json;
pub mod latlong;
pub mod lines;
pub mod version;
pub mod xml;

pub use crate::parser::mime::{decode_message, repair_mime, DecodedMessage};

/// Anything fields can be looked up in by name: a viewer XML document, a
/// `FormData.txt` side channel, or `Label: value` lines of a text body.
///
/// Forms that arrive in more than one encoding are extracted through this
/// trait, so every encoding yields the same values for the same names.
pub trait FieldSource {
    /// Exact lookup. `Some("")` means the field exists but is empty.
    fn lookup(&self, name: &str) -> Option<String>;

    /// Trimmed value of `name`, or `""` when absent.
    ///
    /// Names starting with a lowercase letter are retried with the first
    /// letter capitalized, because older templates are inconsistent about it.
    fn value(&self, name: &str) -> String {
        if let Some(v) = self.lookup(name) {
            return v;
        }
        capitalize_first(name)
            .and_then(|capitalized| self.lookup(&capitalized))
            .unwrap_or_default()
    }

    /// `Some(value)` when the field is present and not empty.
    fn optional(&self, name: &str) -> Option<String> {
        let v = self.value(name);
        (!v.is_empty()).then_some(v)
    }

    /// First non-empty value among several alternative names.
    fn first_of(&self, names: &[&str]) -> String {
        names
            .iter()
            .map(|n| self.value(n))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

/// `"maplat"` → `Some("Maplat")`; `None` when the first letter is not lowercase.
pub fn capitalize_first(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if !first.is_lowercase() {
        return None;
    }
    Some(first.to_uppercase().chain(chars).collect())
}
