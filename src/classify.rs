//! Message type classification.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. viewer attachment name (exact, or prefix for versioned families)
//! 2. `MapFileName` declared by the form-data side channel
//! 3. subject line
//! 4. body structure
//! 5. [`MessageTypeId::Plain`]

use std::sync::Arc;

use tracing::{debug, info};

use crate::forms::ParserContext;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::toolkit::formdata::first_line_map_file_name;
use crate::toolkit::json::DYFI_BEGIN_MARKER;
use crate::toolkit::lines::{field_after, split_lines};

/// How a subject rule compares the subject line.
#[derive(Debug, Clone, Copy)]
enum SubjectMatch {
    StartsWith(&'static str),
    StartsWithIgnoreCase(&'static str),
    EndsWithIgnoreCase(&'static str),
    ContainsIgnoreCase(&'static str),
}

impl SubjectMatch {
    fn matches(self, subject: &str) -> bool {
        let subject = subject.trim();
        match self {
            Self::StartsWith(p) => subject.starts_with(p),
            Self::StartsWithIgnoreCase(p) => subject
                .get(..p.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(p)),
            Self::EndsWithIgnoreCase(s) => subject
                .len()
                .checked_sub(s.len())
                .and_then(|start| subject.get(start..))
                .is_some_and(|tail| tail.eq_ignore_ascii_case(s)),
            Self::ContainsIgnoreCase(s) => subject.to_lowercase().contains(&s.to_lowercase()),
        }
    }
}

/// Subject rules in evaluation order. Matching is case-sensitive unless the
/// rule says otherwise.
const SUBJECT_RULES: &[(SubjectMatch, MessageTypeId)] = &[
    (SubjectMatch::StartsWithIgnoreCase("ACK:"), MessageTypeId::Ack),
    (SubjectMatch::StartsWith("DYFI"), MessageTypeId::Dyfi),
    (SubjectMatch::StartsWith("ETO Check-In"), MessageTypeId::EtoCheckIn),
    (SubjectMatch::StartsWith("ETO Resume"), MessageTypeId::EtoResume),
    (SubjectMatch::EndsWithIgnoreCase("Hurricane Report"), MessageTypeId::WxHurricane),
    (SubjectMatch::StartsWith("Pegelstand"), MessageTypeId::WaterLevel),
    (SubjectMatch::ContainsIgnoreCase("Water Level Report"), MessageTypeId::WaterLevel),
    (SubjectMatch::StartsWith("POSITION REPORT"), MessageTypeId::Position),
    (SubjectMatch::StartsWith("QUICK WELFARE"), MessageTypeId::RriQuickWelfare),
];

/// Resolves the type of a raw message. Always returns a type.
#[derive(Debug, Clone)]
pub struct Classifier {
    context: Arc<ParserContext>,
}

impl Classifier {
    pub fn new(context: Arc<ParserContext>) -> Self {
        Self { context }
    }

    pub fn classify(&self, raw: &RawMessage) -> MessageTypeId {
        let (message_type, rule) = self.resolve(raw);
        if self.context.is_filtered(raw) {
            info!(message_id = %raw.message_id, from = %raw.from, %message_type, rule, "Classified filtered message");
        } else {
            debug!(message_id = %raw.message_id, %message_type, rule, "Classified message");
        }
        message_type
    }

    fn resolve(&self, raw: &RawMessage) -> (MessageTypeId, &'static str) {
        if let Some(t) = by_attachment_name(raw) {
            return (t, "attachment");
        }
        if let Some(t) = self.by_map_file_name(raw) {
            return (t, "map_file_name");
        }
        if let Some(t) = by_subject(&raw.subject) {
            return (t, "subject");
        }
        if let Some(t) = by_structure(raw) {
            return (t, "structure");
        }
        (MessageTypeId::Plain, "default")
    }

    /// The `FormData.txt` attachment's first line, or the side-channel
    /// store entry for this sender and id.
    fn by_map_file_name(&self, raw: &RawMessage) -> Option<MessageTypeId> {
        let declared = match raw.form_data_text() {
            Some(text) => first_line_map_file_name(&text),
            None => self
                .context
                .form_data
                .get(&raw.from, &raw.message_id)
                .and_then(|data| data.map_file_name().map(str::to_string)),
        }?;
        MessageTypeId::ALL.into_iter().find(|t| {
            t.map_file_prefix()
                .is_some_and(|prefix| declared.trim().starts_with(prefix))
        })
    }
}

fn by_attachment_name(raw: &RawMessage) -> Option<MessageTypeId> {
    MessageTypeId::ALL
        .into_iter()
        .find(|t| t.find_attachment(raw.attachment_names()).is_some())
}

fn by_subject(subject: &str) -> Option<MessageTypeId> {
    SUBJECT_RULES
        .iter()
        .find(|(rule, _)| rule.matches(subject))
        .map(|(_, t)| *t)
}

fn by_structure(raw: &RawMessage) -> Option<MessageTypeId> {
    let body = raw.body_text().ok()?;
    if body.contains(DYFI_BEGIN_MARKER) {
        return Some(MessageTypeId::Dyfi);
    }
    let lines = split_lines(&body);
    let has_position = field_after(&lines, "LATITUDE:").is_some() && field_after(&lines, "LONGITUDE:").is_some();
    has_position.then_some(MessageTypeId::Position)
}
