//! HICS 259 Hospital Casualty/Fatality Report.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::FieldSource;

/// `(label, tag stem)`; each stem has `_adult`, `_peds` and `_comment` tags.
const CATEGORIES: &[(&str, &str)] = &[
    ("Patients seen", "seen"),
    ("Waiting to be seen", "waiting"),
    ("Admitted", "admitted"),
    ("Critical care", "critical"),
    ("Medical/surgical", "medical"),
    ("Pediatric", "pediatric"),
    ("Discharged", "discharged"),
    ("Transferred", "transferred"),
    ("Expired", "expired"),
];

#[derive(Debug, Clone, Serialize)]
pub struct CasualtyCount {
    pub category: String,
    pub adult: String,
    pub pediatric: String,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics259Message {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub incident_name: String,
    pub date: String,
    pub time: String,
    pub operational_period_from: String,
    pub operational_period_to: String,
    pub facility_name: String,
    pub casualties: Vec<CasualtyCount>,
    pub prepared_by: String,
    pub prepared_position: String,
}

pub struct Hics259Parser;

impl FormParser for Hics259Parser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Hics259
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Hics259)?;
        let casualties = CATEGORIES
            .iter()
            .map(|(label, stem)| CasualtyCount {
                category: label.to_string(),
                adult: doc.value(&format!("{stem}_adult")),
                pediatric: doc.value(&format!("{stem}_peds")),
                comment: doc.value(&format!("{stem}_comment")),
            })
            .collect();

        Ok(TypedMessage::Hics259(Hics259Message {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            incident_name: doc.value("incname"),
            date: doc.value("date"),
            time: doc.value("time"),
            operational_period_from: doc.value("opfrom"),
            operational_period_to: doc.value("opto"),
            facility_name: doc.value("facility"),
            casualties,
            prepared_by: doc.value("prepname"),
            prepared_position: doc.value("preppos"),
        }))
    }
}
