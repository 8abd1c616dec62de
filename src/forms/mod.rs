//! Per-type form parsers.
//!
//! Every parser implements [`FormParser`]. A parser's `extract` reports
//! known failures as [`ExtractError::Rejected`] and anything else as a plain
//! error; the provided [`FormParser::parse`] turns both, and panics, into a
//! [`RejectionMessage`] so no failure escapes a single message.

pub mod ack;
pub mod bulletin;
pub mod check_in;
pub mod context;
pub mod damage;
pub mod dyfi;
pub mod eto;
pub mod eyewarn;
pub mod field_situation;
pub mod hics;
pub mod hics259;
pub mod hospital_bed;
pub mod humanitarian;
pub mod ics;
pub mod ics205;
pub mod ics206;
pub mod ics209;
pub mod ics213;
pub mod ics213rr;
pub mod ics214;
pub mod ics309;
pub mod ics_comms;
pub mod ics_plan;
pub mod ics_resources;
pub mod plain;
pub mod position;
pub mod radiogram;
pub mod registry;
pub mod shelter;
pub mod skywarn;
pub mod spotrep;
pub mod wa_isnap;
pub mod water_level;
pub mod weather;
pub mod welfare;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

pub use context::ParserContext;
pub use registry::ParserRegistry;

use crate::error::{ExtractError, FormError};
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::{RejectReason, RejectionMessage};
use crate::model::typed::TypedMessage;
use crate::toolkit::version::{normalize_version, VersionToken};
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

/// Result of running one parser on one message.
pub type ParseOutcome = std::result::Result<TypedMessage, RejectionMessage>;

/// One parser per form type.
pub trait FormParser: Send + Sync {
    /// The type this parser produces.
    fn message_type(&self) -> MessageTypeId;

    /// Extract a typed record, or say why not.
    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError>;

    /// Run [`FormParser::extract`], converting every failure into a rejection.
    fn parse(&self, raw: &Arc<RawMessage>) -> ParseOutcome {
        let message_type = self.message_type();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.extract(raw)));

        let (reason, context) = match outcome {
            Ok(Ok(typed)) => return Ok(typed),
            Ok(Err(ExtractError::Rejected { reason, context })) => (reason, context),
            Ok(Err(ExtractError::Form(e))) => (RejectReason::ProcessingError, e.to_string()),
            Err(payload) => (RejectReason::ProcessingError, panic_text(payload.as_ref())),
        };

        if reason == RejectReason::ProcessingError {
            warn!(message_id = %raw.message_id, %message_type, context = %context, "Parser failed");
        } else {
            debug!(message_id = %raw.message_id, %message_type, %reason, "Message rejected");
        }
        Err(RejectionMessage::new(raw.clone(), reason, context, message_type))
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("parser panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("parser panicked: {s}")
    } else {
        "parser panicked".to_string()
    }
}

/// Find and parse the viewer attachment a type is keyed on.
pub(crate) fn viewer_document(
    raw: &RawMessage,
    message_type: MessageTypeId,
) -> Result<FormDocument, ExtractError> {
    let text = viewer_text(raw, message_type)?;
    Ok(FormDocument::parse(&raw.message_id, &text)?)
}

/// Like [`viewer_document`], removing one embedded block first.
pub(crate) fn viewer_document_without(
    raw: &RawMessage,
    message_type: MessageTypeId,
    block: &str,
) -> Result<FormDocument, ExtractError> {
    let text = viewer_text(raw, message_type)?;
    Ok(FormDocument::parse_without_block(&raw.message_id, &text, block)?)
}

fn viewer_text(raw: &RawMessage, message_type: MessageTypeId) -> Result<String, ExtractError> {
    match raw.viewer_text(message_type) {
        Some((_, text)) => Ok(text?),
        None => Err(FormError::MissingAttachment {
            message_id: raw.message_id.clone(),
            name: message_type
                .attachment_rule()
                .map(|r| r.to_string())
                .unwrap_or_else(|| message_type.to_string()),
        }
        .into()),
    }
}

/// Template version, the last token of `templateversion`.
pub(crate) fn template_version(source: &impl FieldSource) -> Option<String> {
    let raw = source.first_of(&["templateversion", "template_version", "version"]);
    let version = normalize_version(&raw, VersionToken::Last);
    (!version.is_empty()).then_some(version)
}

/// Collect numbered rows `1..=max`, skipping rows whose fields are all empty.
pub(crate) fn numbered_rows<T>(max: usize, row: impl FnMut(usize) -> Option<T>) -> Vec<T> {
    (1..=max).filter_map(row).collect()
}

pub(crate) fn all_empty<S: AsRef<str>>(values: &[S]) -> bool {
    values.iter().all(|v| v.as_ref().trim().is_empty())
}

/// Checkbox values as the templates write them.
pub(crate) fn is_checked(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "checked" | "x" | "on")
}

/// Labels of the `(label, tag)` checkboxes that are ticked, in table order.
pub(crate) fn checked_labels(source: &impl FieldSource, table: &[(&str, &str)]) -> Vec<String> {
    table
        .iter()
        .filter(|(_, tag)| is_checked(&source.value(tag)))
        .map(|(label, _)| label.to_string())
        .collect()
}
