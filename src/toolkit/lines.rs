//! Field lookup in `Label: value` style plain-text bodies.

use super::FieldSource;

/// Remainder of the first line that starts with `label`, trimmed.
///
/// The label is matched case-insensitively after leading whitespace. It
/// usually includes its delimiter (`"LATITUDE:"`).
pub fn field_after(lines: &[&str], label: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let line = line.trim_start();
        let head = line.get(..label.len())?;
        head.eq_ignore_ascii_case(label)
            .then(|| line[label.len()..].trim().to_string())
    })
}

/// Lines of a body, tolerant of `\r\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().map(|l| l.trim_end_matches('\r')).collect()
}

/// A text body read as `Label<delim> value` pairs.
///
/// Keys are compared case-insensitively. The first occurrence of a key wins,
/// matching [`field_after`].
#[derive(Debug, Clone, Default)]
pub struct TextFields {
    entries: Vec<(String, String)>,
}

impl TextFields {
    pub fn parse(text: &str, delimiter: char) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(delimiter)?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FieldSource for TextFields {
    fn lookup(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}
