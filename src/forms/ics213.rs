//! ICS-213 General Message, as sent and as replied to, and the HICS-213
//! hospital variant of the same template.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Serialize)]
pub struct Ics213Message {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub incident_name: String,
    pub form_to: String,
    pub form_from: String,
    pub form_subject: String,
    pub form_date: String,
    pub form_time: String,
    pub form_message: String,
    pub approved_name: String,
    pub approved_position: String,
    /// Present on the reply template only.
    pub reply: Option<Ics213Reply>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics213Reply {
    pub reply: String,
    pub replied_by: String,
    pub reply_position: String,
    pub reply_date_time: String,
}

pub struct Ics213Parser {
    message_type: MessageTypeId,
}

impl Ics213Parser {
    /// `message_type` is [`MessageTypeId::Ics213`], [`MessageTypeId::Ics213Reply`]
    /// or [`MessageTypeId::Hics213`].
    pub fn new(message_type: MessageTypeId) -> Self {
        Self { message_type }
    }

    fn read(&self, raw: &Arc<RawMessage>, doc: &FormDocument) -> Ics213Message {
        let reply = (self.message_type == MessageTypeId::Ics213Reply).then(|| Ics213Reply {
            reply: doc.value("reply"),
            replied_by: doc.value("replyby"),
            reply_position: doc.value("replypos"),
            reply_date_time: doc.value("replydt"),
        });

        Ics213Message {
            raw: raw.clone(),
            version: template_version(doc),
            organization: doc.value("organization"),
            incident_name: doc.first_of(&["inc_name", "incname"]),
            form_to: doc.value("to_name"),
            form_from: doc.value("fm_name"),
            form_subject: doc.value("subjectline"),
            form_date: doc.value("mdate"),
            form_time: doc.value("mtime"),
            form_message: doc.value("message"),
            approved_name: doc.value("approved_name"),
            approved_position: doc.value("approved_postitle"),
            reply,
        }
    }
}

impl FormParser for Ics213Parser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, self.message_type)?;
        let message = self.read(raw, &doc);
        Ok(match self.message_type {
            MessageTypeId::Ics213Reply => TypedMessage::Ics213Reply(message),
            MessageTypeId::Hics213 => TypedMessage::Hics213(message),
            _ => TypedMessage::Ics213(message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = "<RMS_Express_Form><variables>\
<inc_name>Coastal Storm</inc_name><to_name>EOC</to_name><fm_name>Shelter 3</fm_name>\
<subjectline>Cots</subjectline><message>Need 40 cots</message>\
<reply>Sending 20</reply><replyby>Logistics</replyby>\
</variables></RMS_Express_Form>";

    #[test]
    fn test_initial() {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "ICS 213").with_attachment("ICS213_Initial_Viewer.xml", XML),
        );
        let Ok(TypedMessage::Ics213(m)) = Ics213Parser::new(MessageTypeId::Ics213).parse(&raw) else {
            panic!("expected ICS-213");
        };
        assert_eq!(m.incident_name, "Coastal Storm");
        assert_eq!(m.form_message, "Need 40 cots");
        assert!(m.reply.is_none());
    }

    #[test]
    fn test_reply() {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "RE: ICS 213")
                .with_attachment("RMS_Express_Form_ICS213_SendReply_Viewer.xml", XML),
        );
        let Ok(TypedMessage::Ics213Reply(m)) =
            Ics213Parser::new(MessageTypeId::Ics213Reply).parse(&raw)
        else {
            panic!("expected ICS-213 reply");
        };
        let reply = m.reply.unwrap();
        assert_eq!(reply.reply, "Sending 20");
        assert_eq!(reply.replied_by, "Logistics");
    }

    #[test]
    fn test_hospital_variant() {
        let xml = "<form><incname>Power outage</incname><to_name>Command</to_name><message>Generator 2 down</message></form>";
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "HICS 213").with_attachment("HICS 213_viewer.xml", xml));
        let Ok(TypedMessage::Hics213(m)) = Ics213Parser::new(MessageTypeId::Hics213).parse(&raw) else {
            panic!("expected HICS-213");
        };
        assert_eq!(m.incident_name, "Power outage");
        assert_eq!(m.form_message, "Generator 2 down");
        assert!(m.reply.is_none());
    }
}
