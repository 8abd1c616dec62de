//! Messages no other rule recognized.

use std::sync::Arc;

use serde::Serialize;

use super::FormParser;
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;

#[derive(Debug, Clone, Serialize)]
pub struct PlainMessage {
    pub raw: Arc<RawMessage>,
    pub body: String,
}

pub struct PlainParser;

impl FormParser for PlainParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Plain
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
        Ok(TypedMessage::Plain(PlainMessage {
            raw: raw.clone(),
            body,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_body() {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "hello").with_plain_content("73"));
        let TypedMessage::Plain(m) = PlainParser.parse(&raw).unwrap() else {
            panic!("expected plain");
        };
        assert_eq!(m.body, "73");
    }

    #[test]
    fn test_undecodable_mime_rejected() {
        let raw = Arc::new(RawMessage::new("MID", "", "").with_mime("no headers at all"));
        let rejection = PlainParser.parse(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseMime);
    }
}
