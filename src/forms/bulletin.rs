//! Free-text broadcast forms: the Bulletin and the Quick Message.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Serialize)]
pub struct BulletinMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub bulletin_number: String,
    pub precedence: String,
    pub title: String,
    pub issued_by: String,
    pub issued_date_time: String,
    pub expires: String,
    pub body: String,
}

pub struct BulletinParser;

impl FormParser for BulletinParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Bulletin
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Bulletin)?;
        Ok(TypedMessage::Bulletin(BulletinMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            bulletin_number: doc.first_of(&["bulletinnum", "bulletin_number"]),
            precedence: doc.value("precedence"),
            title: doc.first_of(&["title", "subjectline"]),
            issued_by: doc.value("issuedby"),
            issued_date_time: doc.value("issueddatetime"),
            expires: doc.value("expires"),
            body: doc.first_of(&["message", "bulletin"]),
        }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub form_to: String,
    pub form_from: String,
    pub form_date_time: String,
    pub body: String,
}

pub struct QuickMessageParser;

impl FormParser for QuickMessageParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::QuickMessage
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::QuickMessage)?;
        Ok(TypedMessage::QuickMessage(QuickMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            form_to: doc.first_of(&["to_name", "msgto"]),
            form_from: doc.first_of(&["fm_name", "msgfrom"]),
            form_date_time: doc.first_of(&["datetime", "msgdatetime"]),
            body: doc.first_of(&["message", "msgbody"]),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulletin() {
        let xml = "<form><templateversion>Bulletin 1.3</templateversion><bulletinnum>7</bulletinnum>\
<title>Net schedule</title><message>Nightly net at 1900 on the repeater</message></form>";
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "BUL").with_attachment("Bulletin_viewer.xml", xml));
        let Ok(TypedMessage::Bulletin(m)) = BulletinParser.parse(&raw) else {
            panic!("expected bulletin");
        };
        assert_eq!(m.version.as_deref(), Some("1.3"));
        assert_eq!(m.bulletin_number, "7");
        assert_eq!(m.title, "Net schedule");
        assert!(m.body.starts_with("Nightly net"));
    }

    #[test]
    fn test_quick_message_alternate_tags() {
        let xml = "<form><msgto>EOC</msgto><msgfrom>Shelter 2</msgfrom><msgbody>Water arrived</msgbody></form>";
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "QM").with_attachment("RMS_Express_Form_Quick Message_viewer.xml", xml),
        );
        let Ok(TypedMessage::QuickMessage(m)) = QuickMessageParser.parse(&raw) else {
            panic!("expected quick message");
        };
        assert_eq!(m.form_to, "EOC");
        assert_eq!(m.form_from, "Shelter 2");
        assert_eq!(m.body, "Water arrived");
    }
}
