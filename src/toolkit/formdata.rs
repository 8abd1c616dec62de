//! The `FormData.txt` side channel.
//!
//! Winlink Express writes the raw field values of a submitted form as
//! `key=value` lines. The first line names the HTML template that produced
//! it (`MapFileName=Winlink Check In Initial.html`). Lines without `=`
//! continue the previous value.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use super::FieldSource;
use crate::error::{FormError, Result};

/// Key naming the template in the first line.
pub const MAP_FILE_KEY: &str = "MapFileName";

/// Parsed `key=value` form data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(text: &str) -> Self {
        let mut entries: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            match line.split_once('=') {
                Some((key, value)) if is_key(key) => {
                    entries.push((key.trim().to_string(), value.trim().to_string()));
                }
                _ => {
                    if let Some((_, value)) = entries.last_mut() {
                        if !line.trim().is_empty() {
                            value.push('\n');
                            value.push_str(line.trim());
                        }
                    }
                }
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The template name declared on the first line, if any.
    pub fn map_file_name(&self) -> Option<&str> {
        self.entries
            .first()
            .filter(|(k, _)| k.eq_ignore_ascii_case(MAP_FILE_KEY))
            .map(|(_, v)| v.as_str())
    }
}

/// Keys are single identifiers; anything else is a continuation line that
/// happens to contain `=`.
fn is_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.contains(char::is_whitespace)
}

/// Template name from the first non-blank line of raw form-data text,
/// without parsing the rest.
pub fn first_line_map_file_name(text: &str) -> Option<String> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (key, value) = first.split_once('=')?;
    key.trim()
        .eq_ignore_ascii_case(MAP_FILE_KEY)
        .then(|| value.trim().to_string())
}

impl FieldSource for FormData {
    fn lookup(&self, name: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

/// Form data that arrived separately from its message, keyed by
/// `(sender call sign, message id)`.
///
/// Built once before processing starts and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct FormDataStore {
    entries: HashMap<(String, String), FormData>,
}

impl FormDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sender: &str, message_id: &str, data: FormData) {
        self.entries.insert(store_key(sender, message_id), data);
    }

    pub fn get(&self, sender: &str, message_id: &str) -> Option<&FormData> {
        self.entries.get(&store_key(sender, message_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load every `<SENDER>_<MESSAGEID>.txt` file in a directory.
    ///
    /// Files whose names do not split into sender and message id are skipped
    /// with a warning.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::new();
        let entries = std::fs::read_dir(dir).map_err(|e| FormError::io(dir, e))?;
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some((sender, message_id)) = stem.rsplit_once('_') else {
                warn!(path = %path.display(), "Form data file name is not SENDER_MESSAGEID");
                continue;
            };
            let bytes = std::fs::read(&path).map_err(|e| FormError::io(&path, e))?;
            let text = crate::parser::header::decode_text_bytes(&bytes);
            store.insert(sender, message_id, FormData::parse(&text));
        }
        debug!(dir = %dir.display(), entries = store.len(), "Loaded form data store");
        Ok(store)
    }
}

fn store_key(sender: &str, message_id: &str) -> (String, String) {
    (sender.trim().to_ascii_uppercase(), message_id.trim().to_string())
}
