//! Acknowledgements: "ACK:" replies listing the message ids they confirm.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;

use super::FormParser;
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;

/// Winlink message ids: twelve upper-case letters and digits.
static MESSAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z0-9]{12}\b").expect("valid regex"));

#[derive(Debug, Clone, Serialize)]
pub struct AckMessage {
    pub raw: Arc<RawMessage>,
    /// Subject of the acknowledged message, from `ACK: <subject>`.
    pub original_subject: String,
    pub acknowledged_ids: Vec<String>,
}

pub struct AckParser;

impl FormParser for AckParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ack
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;

        let subject = raw.subject.trim();
        let original_subject = subject
            .get(4..)
            .filter(|_| subject.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("ACK:")))
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(TypedMessage::Ack(AckMessage {
            raw: raw.clone(),
            original_subject,
            acknowledged_ids: message_ids(&body),
        }))
    }
}

/// Distinct message ids in order of appearance. Tokens without a digit are
/// ordinary words, not ids.
fn message_ids(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for m in MESSAGE_ID.find_iter(text) {
        let id = m.as_str();
        if id.bytes().any(|b| b.is_ascii_digit()) && !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids() {
        let body = "ACKNOWLEDGED receipt of 7KQ2ZP1XRT4M and 9ABCD3EFGH12.\nRe: 7KQ2ZP1XRT4M";
        assert_eq!(message_ids(body), vec!["7KQ2ZP1XRT4M", "9ABCD3EFGH12"]);
    }

    #[test]
    fn test_ack_record() {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "ACK: Winlink Check In")
                .with_plain_content("Received 7KQ2ZP1XRT4M"),
        );
        let TypedMessage::Ack(ack) = AckParser.parse(&raw).unwrap() else {
            panic!("expected ack");
        };
        assert_eq!(ack.original_subject, "Winlink Check In");
        assert_eq!(ack.acknowledged_ids, vec!["7KQ2ZP1XRT4M"]);
    }

    #[test]
    fn test_subject_with_leading_space() {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "  ack: Winlink Check In ").with_plain_content(""));
        let TypedMessage::Ack(ack) = AckParser.parse(&raw).unwrap() else {
            panic!("expected ack");
        };
        assert_eq!(ack.original_subject, "Winlink Check In");
        assert!(ack.acknowledged_ids.is_empty());
    }
}
