//! Shelter Status Report.

use std::sync::Arc;

use serde::Serialize;

use super::{checked_labels, template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::FieldSource;

/// `(service, checkbox tag)` for the services block.
const SERVICES: &[(&str, &str)] = &[
    ("Food", "svc_food"),
    ("Water", "svc_water"),
    ("Medical", "svc_medical"),
    ("Pets", "svc_pets"),
    ("Power", "svc_power"),
    ("Showers", "svc_showers"),
    ("Laundry", "svc_laundry"),
];

#[derive(Debug, Clone, Serialize)]
pub struct ShelterStatusMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub report_date_time: String,
    pub shelter_name: String,
    /// `Open`, `Closed`, `Full` or `Standby`.
    pub status: String,
    pub shelter_type: String,
    pub address: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub location: Option<LatLongPair>,
    pub capacity: String,
    pub occupancy: String,
    pub manager: String,
    pub contact_phone: String,
    pub services: Vec<String>,
    pub needs: String,
    pub comments: String,
}

impl ShelterStatusMessage {
    /// Free places, when both counts are numbers; never negative.
    pub fn available_capacity(&self) -> Option<u32> {
        let capacity = self.capacity.trim().parse::<u32>().ok()?;
        let occupancy = self.occupancy.trim().parse::<u32>().ok()?;
        Some(capacity.saturating_sub(occupancy))
    }
}

pub struct ShelterStatusParser;

impl FormParser for ShelterStatusParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::ShelterStatus
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::ShelterStatus)?;
        Ok(TypedMessage::ShelterStatus(ShelterStatusMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            report_date_time: doc.value("datetime"),
            shelter_name: doc.first_of(&["sheltername", "shelter"]),
            status: doc.value("status"),
            shelter_type: doc.value("sheltertype"),
            address: doc.value("address"),
            city: doc.value("city"),
            county: doc.value("county"),
            state: doc.value("state"),
            location: resolve_lat_long(&doc, &["shelter"]).found(),
            capacity: doc.value("capacity"),
            occupancy: doc.value("occupancy"),
            manager: doc.value("manager"),
            contact_phone: doc.value("phone"),
            services: checked_labels(&doc, SERVICES),
            needs: doc.value("needs"),
            comments: doc.value("comments"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> ShelterStatusMessage {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "Shelter").with_attachment("Shelter Status Report_viewer.xml", xml),
        );
        let Ok(TypedMessage::ShelterStatus(m)) = ShelterStatusParser.parse(&raw) else {
            panic!("expected shelter status");
        };
        m
    }

    #[test]
    fn test_shelter_status() {
        let m = parse(
            "<form><sheltername>Lincoln High</sheltername><status>Open</status>\
<capacity>250</capacity><occupancy>180</occupancy>\
<svc_food>Yes</svc_food><svc_pets>checked</svc_pets>\
<maplat>44.05</maplat><maplon>-121.31</maplon></form>",
        );
        assert_eq!(m.shelter_name, "Lincoln High");
        assert_eq!(m.available_capacity(), Some(70));
        assert_eq!(m.services, vec!["Food", "Pets"]);
        assert_eq!(m.location, Some(LatLongPair::new("44.05", "-121.31")));
    }

    #[test]
    fn test_over_capacity_and_unknown_counts() {
        let full = parse("<form><capacity>100</capacity><occupancy>120</occupancy></form>");
        assert_eq!(full.available_capacity(), Some(0));
        assert!(full.location.is_none());

        let unknown = parse("<form><capacity>about 100</capacity><occupancy>20</occupancy></form>");
        assert_eq!(unknown.available_capacity(), None);
    }
}
