//! Hospital Bed Report. Each bed category with data also becomes a
//! [`HospitalBedDetail`] record.

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

/// `(category, tag stem)`; each stem has `_count` and `_notes` tags.
const BED_CATEGORIES: &[(&str, &str)] = &[
    ("Emergency", "emergency"),
    ("Pediatrics", "pediatrics"),
    ("Medical/Surgical", "medical"),
    ("Psychiatry", "psychiatry"),
    ("Burn", "burn"),
    ("Critical Care", "critical"),
    ("Other", "other"),
];

#[derive(Debug, Clone, Serialize)]
pub struct HospitalBedDetail {
    pub raw: Arc<RawMessage>,
    pub facility: String,
    pub category: String,
    pub count: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HospitalBedMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub is_exercise: String,
    pub form_date_time: String,
    pub facility: String,
    pub street: String,
    pub city: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub location: Option<LatLongPair>,
    pub beds: Vec<HospitalBedDetail>,
    pub additional_comments: String,
}

pub struct HospitalBedParser;

impl FormParser for HospitalBedParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::HospitalBed
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::HospitalBed)?;
        let facility = doc.value("facility");

        let beds = BED_CATEGORIES
            .iter()
            .filter_map(|(category, stem)| {
                let count = doc.value(&format!("{stem}_count"));
                let notes = doc.value(&format!("{stem}_notes"));
                (!all_empty(&[&count, &notes])).then(|| HospitalBedDetail {
                    raw: raw.clone(),
                    facility: facility.clone(),
                    category: category.to_string(),
                    count,
                    notes,
                })
            })
            .collect();

        Ok(TypedMessage::HospitalBed(HospitalBedMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            is_exercise: doc.value("isexercise"),
            form_date_time: doc.value("datetime"),
            facility,
            street: doc.value("street"),
            city: doc.value("city"),
            contact_person: doc.value("contact_person"),
            contact_phone: doc.value("contact_phone"),
            contact_email: doc.value("contact_email"),
            location: resolve_lat_long(&doc, &[]).found(),
            beds,
            additional_comments: doc.value("comments"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_per_reported_category() {
        let xml = "<form><facility>Mercy</facility>\
<emergency_count>4</emergency_count><burn_notes>unit closed</burn_notes>\
<maplat>38.5</maplat><maplon>-121.5</maplon></form>";
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "Beds")
                .with_attachment("RMS_Express_Form_Hospital Bed Report_viewer.xml", xml),
        );
        let typed = HospitalBedParser.parse(&raw).unwrap();
        let details = typed.details();
        assert_eq!(details.len(), 2);
        assert!(details.iter().all(|d| d.message_type() == MessageTypeId::HospitalBedDetail));

        let TypedMessage::HospitalBed(m) = typed else {
            panic!("expected hospital bed");
        };
        assert_eq!(m.beds[0].category, "Emergency");
        assert_eq!(m.beds[0].facility, "Mercy");
        assert_eq!(m.beds[1].notes, "unit closed");
        assert!(m.location.is_some());
    }
}
