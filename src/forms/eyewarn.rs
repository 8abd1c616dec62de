//! EyeWarn observation reports.
//!
//! The form groups observations into colour-coded blocks (red, yellow,
//! green, blue, black). Each block that holds anything becomes an
//! [`EyeWarnDetail`].

use std::sync::Arc;

use serde::Serialize;

use super::{all_empty, template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::FieldSource;

pub const COLOR_BLOCKS: [&str; 5] = ["red", "yellow", "green", "blue", "black"];

#[derive(Debug, Clone, Serialize)]
pub struct EyeWarnDetail {
    pub raw: Arc<RawMessage>,
    pub exercise_id: String,
    pub color: String,
    pub count: String,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EyeWarnMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub exercise_id: String,
    pub report_date_time: String,
    pub reporter: String,
    pub location: Option<LatLongPair>,
    pub details: Vec<EyeWarnDetail>,
    pub comments: String,
}

pub struct EyeWarnParser;

impl FormParser for EyeWarnParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::EyeWarn
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::EyeWarn)?;
        let exercise_id = doc.first_of(&["exerciseid", "exercise_id"]);

        let details = COLOR_BLOCKS
            .iter()
            .filter_map(|color| {
                let count = doc.value(&format!("{color}_count"));
                let location = doc.value(&format!("{color}_location"));
                let description = doc.value(&format!("{color}_description"));
                if all_empty(&[&count, &location, &description]) {
                    return None;
                }
                Some(EyeWarnDetail {
                    raw: raw.clone(),
                    exercise_id: exercise_id.clone(),
                    color: color.to_ascii_uppercase(),
                    count,
                    location,
                    description,
                })
            })
            .collect();

        Ok(TypedMessage::EyeWarn(EyeWarnMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            exercise_id,
            report_date_time: doc.value("datetime"),
            reporter: doc.value("reporter"),
            location: resolve_lat_long(&doc, &["report"]).found(),
            details,
            comments: doc.value("comments"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_blocks() {
        let xml = "<form><exerciseid>EX-7</exerciseid>\
<red_count>2</red_count><red_description>downed lines</red_description>\
<blue_location>Main St bridge</blue_location>\
<reportlat>45.5</reportlat><reportlon>-122.6</reportlon></form>";
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "EyeWarn").with_attachment("EyeWarn_viewer.xml", xml),
        );
        let typed = EyeWarnParser.parse(&raw).unwrap();
        assert_eq!(typed.details().len(), 2);

        let TypedMessage::EyeWarn(m) = typed else {
            panic!("expected EyeWarn");
        };
        assert_eq!(m.details[0].color, "RED");
        assert_eq!(m.details[0].exercise_id, "EX-7");
        assert_eq!(m.details[1].color, "BLUE");
        assert_eq!(m.location, Some(LatLongPair::new("45.5", "-122.6")));
    }
}
