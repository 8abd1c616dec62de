//! Washington State ISNAP (Initial Situation and Needs Assessment Picture).

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::FieldSource;

/// `(sector, tag stem)`; each stem has `_status` and `_comments` tags.
const SECTORS: &[(&str, &str)] = &[
    ("Government", "government"),
    ("Transportation", "transportation"),
    ("Utilities", "utilities"),
    ("Medical", "medical"),
    ("Communications", "communications"),
    ("Public safety", "publicsafety"),
    ("Environment", "environment"),
];

#[derive(Debug, Clone, Serialize)]
pub struct SectorStatus {
    pub sector: String,
    pub status: String,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaIsnapMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub form_date_time: String,
    pub incident_name: String,
    pub incident_type: String,
    pub county: String,
    pub city: String,
    pub tribe: String,
    pub eoc_status: String,
    pub declaration: String,
    pub description: String,
    pub sectors: Vec<SectorStatus>,
    pub point_of_contact: String,
}

pub struct WaIsnapParser;

impl FormParser for WaIsnapParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::WaIsnap
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::WaIsnap)?;
        let sectors = SECTORS
            .iter()
            .map(|(sector, stem)| SectorStatus {
                sector: sector.to_string(),
                status: doc.value(&format!("{stem}_status")),
                comments: doc.value(&format!("{stem}_comments")),
            })
            .collect();

        Ok(TypedMessage::WaIsnap(WaIsnapMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            form_date_time: doc.value("datetime"),
            incident_name: doc.value("incname"),
            incident_type: doc.value("inctype"),
            county: doc.value("county"),
            city: doc.value("city"),
            tribe: doc.value("tribe"),
            eoc_status: doc.value("eocstatus"),
            declaration: doc.value("declaration"),
            description: doc.value("description"),
            sectors,
            point_of_contact: doc.value("poc"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_statuses() {
        let xml = "<form><county>King</county><eocstatus>Activated</eocstatus>\
<medical_status>Red</medical_status><medical_comments>ER full</medical_comments></form>";
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "ISNAP").with_attachment("WA ISNAP_viewer.xml", xml));
        let Ok(TypedMessage::WaIsnap(m)) = WaIsnapParser.parse(&raw) else {
            panic!("expected ISNAP");
        };
        assert_eq!(m.county, "King");
        assert_eq!(m.eoc_status, "Activated");
        let medical = m.sectors.iter().find(|s| s.sector == "Medical").unwrap();
        assert_eq!((medical.status.as_str(), medical.comments.as_str()), ("Red", "ER full"));
    }
}
