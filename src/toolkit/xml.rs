//! Viewer-attachment documents.
//!
//! Winlink viewer XML is shallow: a root, a `form_parameters` block and a
//! `variables` block of leaf elements. The document is parsed once with
//! `roxmltree` and flattened into an owned element list, so it can be kept
//! and queried without borrowing the source text.

use roxmltree::Document;
use tracing::debug;

use super::FieldSource;
use crate::error::{FormError, Result};

/// Block some templates embed with unescaped markup that breaks parsing.
pub const PARSEME_BLOCK: &str = "parseme";

#[derive(Debug, Clone)]
struct Element {
    name: String,
    text: String,
}

/// A parsed viewer document.
#[derive(Debug, Clone)]
pub struct FormDocument {
    message_id: String,
    elements: Vec<Element>,
}

impl FormDocument {
    /// Build a document from attachment text.
    ///
    /// Leading garbage before the first `<` is dropped and a missing final `>`
    /// is restored. A document that still does not parse is an error: every
    /// later field lookup on it would be meaningless.
    pub fn parse(message_id: &str, text: &str) -> Result<Self> {
        Self::build(message_id, prepare(text, None))
    }

    /// Like [`FormDocument::parse`], first removing a `<block>…</block>` section.
    pub fn parse_without_block(message_id: &str, text: &str, block: &str) -> Result<Self> {
        Self::build(message_id, prepare(text, Some(block)))
    }

    fn build(message_id: &str, prepared: String) -> Result<Self> {
        let doc = Document::parse(&prepared).map_err(|source| FormError::Xml {
            message_id: message_id.to_string(),
            source,
        })?;

        let elements: Vec<Element> = doc
            .descendants()
            .filter(|n| n.is_element())
            .map(|n| Element {
                name: n.tag_name().name().to_string(),
                text: n
                    .descendants()
                    .filter(|d| d.is_text())
                    .filter_map(|d| d.text())
                    .collect::<String>()
                    .trim()
                    .to_string(),
            })
            .collect();

        debug!(message_id, elements = elements.len(), "Built form document");
        Ok(Self {
            message_id: message_id.to_string(),
            elements,
        })
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Whether an element with exactly this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.name == name)
    }

    /// Element names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.name.as_str())
    }
}

impl FieldSource for FormDocument {
    /// Exact tag name first, then any tag whose name differs only in ASCII
    /// case, so viewer and `FormData.txt` lookups agree.
    fn lookup(&self, name: &str) -> Option<String> {
        self.elements
            .iter()
            .find(|e| e.name == name)
            .or_else(|| self.elements.iter().find(|e| e.name.eq_ignore_ascii_case(name)))
            .map(|e| e.text.clone())
    }
}

/// Normalize attachment text before parsing.
fn prepare(text: &str, strip_block: Option<&str>) -> String {
    let start = text.find('<').unwrap_or(text.len());
    let mut body = text[start..].trim_end().to_string();
    if !body.ends_with('>') {
        body.push('>');
    }
    if let Some(block) = strip_block {
        body = remove_block(&body, block);
    }
    body
}

/// Remove every `<block>…</block>` section (tag name matched case-insensitively).
fn remove_block(text: &str, block: &str) -> String {
    let open = format!("<{}", block.to_ascii_lowercase());
    let close = format!("</{}>", block.to_ascii_lowercase());
    let lower = text.to_ascii_lowercase();

    let mut result = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(rel_start) = lower[pos..].find(&open) {
        let start = pos + rel_start;
        result.push_str(&text[pos..start]);
        match lower[start..].find(&close) {
            Some(rel_end) => pos = start + rel_end + close.len(),
            None => {
                pos = text.len();
                break;
            }
        }
    }
    result.push_str(&text[pos..]);
    result
}
