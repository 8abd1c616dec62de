//! Damage Assessment report.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Serialize)]
pub struct DamageAssessmentMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub form_date_time: String,
    pub incident_name: String,
    pub address: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub location: Option<LatLongPair>,
    pub structure_type: String,
    pub occupancy: String,
    pub destroyed: String,
    pub major_damage: String,
    pub minor_damage: String,
    pub affected: String,
    pub estimated_loss: String,
    pub description: String,
    pub contact_name: String,
    pub contact_phone: String,
}

pub struct DamageAssessmentParser;

impl FormParser for DamageAssessmentParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::DamageAssessment
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::DamageAssessment)?;
        Ok(TypedMessage::DamageAssessment(DamageAssessmentMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            form_date_time: doc.value("datetime"),
            incident_name: doc.value("incname"),
            address: doc.value("address"),
            city: doc.value("city"),
            county: doc.value("county"),
            state: doc.value("state"),
            location: resolve_lat_long(&doc, &["site"]).found(),
            structure_type: doc.value("structuretype"),
            occupancy: doc.value("occupancy"),
            destroyed: doc.value("destroyed"),
            major_damage: doc.value("major"),
            minor_damage: doc.value("minor"),
            affected: doc.value("affected"),
            estimated_loss: doc.value("estloss"),
            description: doc.value("description"),
            contact_name: doc.value("contactname"),
            contact_phone: doc.value("contactphone"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_counts() {
        let xml = "<form><city>Paradise</city><destroyed>14</destroyed><Major>3</Major>\
<sitelat>39.76</sitelat><sitelon>-121.62</sitelon></form>";
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "Damage").with_attachment("Damage Assessment_viewer.xml", xml),
        );
        let Ok(TypedMessage::DamageAssessment(m)) = DamageAssessmentParser.parse(&raw) else {
            panic!("expected damage assessment");
        };
        assert_eq!(m.destroyed, "14");
        assert_eq!(m.major_damage, "3");
        assert_eq!(m.location, Some(LatLongPair::new("39.76", "-121.62")));
    }
}
