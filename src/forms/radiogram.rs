//! ARRL Radiogram and the RRI Welfare Radiogram, which share one layout, and
//! the RRI reply template that appends the recipient's answer.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Serialize)]
pub struct RadiogramMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub number: String,
    pub precedence: String,
    pub handling_instructions: String,
    pub station_of_origin: String,
    pub check: String,
    pub place_of_origin: String,
    pub time_filed: String,
    pub date_filed: String,
    pub to_address: String,
    pub to_phone: String,
    pub to_email: String,
    pub body: String,
    pub signature: String,
    /// Present on the reply template only.
    pub reply: Option<RadiogramReply>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadiogramReply {
    pub text: String,
    pub date_time: String,
}

impl RadiogramMessage {
    /// Word count of the text, the way operators count it for the check.
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

pub struct RadiogramParser {
    message_type: MessageTypeId,
}

impl RadiogramParser {
    /// `message_type` is [`MessageTypeId::Radiogram`],
    /// [`MessageTypeId::RriWelfareRadiogram`] or
    /// [`MessageTypeId::RriReplyWelfareRadiogram`].
    pub fn new(message_type: MessageTypeId) -> Self {
        Self { message_type }
    }
}

impl FormParser for RadiogramParser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, self.message_type)?;
        let reply = (self.message_type == MessageTypeId::RriReplyWelfareRadiogram).then(|| RadiogramReply {
            text: doc.first_of(&["reply", "replytext"]),
            date_time: doc.first_of(&["replydatetime", "replydt"]),
        });
        let message = RadiogramMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            number: doc.value("msgnr"),
            precedence: doc.value("precedence"),
            handling_instructions: doc.value("hx"),
            station_of_origin: doc.value("stnorig"),
            check: doc.value("check"),
            place_of_origin: doc.value("placeorig"),
            time_filed: doc.value("timefiled"),
            date_filed: doc.value("datefiled"),
            to_address: doc.value("toaddress"),
            to_phone: doc.value("tophone"),
            to_email: doc.value("toemail"),
            body: doc.value("msgtext"),
            signature: doc.value("signature"),
            reply,
        };
        Ok(match self.message_type {
            MessageTypeId::RriWelfareRadiogram => TypedMessage::RriWelfareRadiogram(message),
            MessageTypeId::RriReplyWelfareRadiogram => TypedMessage::RriReplyWelfareRadiogram(message),
            _ => TypedMessage::Radiogram(message),
        })
    }
}
