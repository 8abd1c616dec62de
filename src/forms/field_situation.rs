//! Field Situation Report, all template generations (`Field Situation
//! Report`, `… 23`, `… 25`, `… 26`).
//!
//! Later generations renamed a few tags; each field lists its names newest
//! first.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

/// `(label, status tag, comments tag)` for each infrastructure line.
const INFRASTRUCTURE: &[(&str, &str, &str)] = &[
    ("POTS landlines", "pots_landlines_functioning", "pots_landlines_comments"),
    ("VoIP landlines", "voip_landlines_functioning", "voip_landlines_comments"),
    ("Cell phone voice", "cell_phone_voice_functioning", "cell_phone_voice_comments"),
    ("Cell phone text", "cell_phone_texts_functioning", "cell_phone_texts_comments"),
    ("AM/FM broadcast", "radio_broadcast_functioning", "radio_broadcast_comments"),
    ("OTA TV", "tv_broadcast_functioning", "tv_broadcast_comments"),
    ("Satellite TV", "satellite_tv_functioning", "satellite_tv_comments"),
    ("Cable TV", "cable_tv_functioning", "cable_tv_comments"),
    ("Public water", "water_functioning", "water_comments"),
    ("Internet", "internet_functioning", "internet_comments"),
    ("NOAA weather radio", "noaa_weather_radio_functioning", "noaa_weather_radio_comments"),
    ("NOAA audio degraded", "noaa_weather_radio_degraded", "noaa_weather_radio_degraded_comments"),
    ("Commercial power", "power_functioning", "power_comments"),
    ("Commercial power stable", "power_stable", "power_stable_comments"),
];

#[derive(Debug, Clone, Serialize)]
pub struct InfrastructureStatus {
    pub service: String,
    /// Usually `YES`, `NO` or `Unknown`.
    pub status: String,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSituationMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub precedence: String,
    pub task: String,
    pub form_date_time: String,
    pub is_help_needed: String,
    pub needed_help: String,
    pub city: String,
    pub county: String,
    pub state: String,
    pub territory: String,
    pub location: Option<LatLongPair>,
    pub infrastructure: Vec<InfrastructureStatus>,
    pub additional_comments: String,
    pub point_of_contact: String,
}

pub struct FieldSituationParser;

impl FieldSituationParser {
    fn read(raw: &Arc<RawMessage>, doc: &FormDocument) -> FieldSituationMessage {
        let infrastructure = INFRASTRUCTURE
            .iter()
            .map(|(label, status_tag, comments_tag)| InfrastructureStatus {
                service: label.to_string(),
                status: doc.value(status_tag),
                comments: doc.value(comments_tag),
            })
            .collect();

        FieldSituationMessage {
            raw: raw.clone(),
            version: template_version(doc),
            organization: doc.value("title"),
            precedence: doc.value("precedence"),
            task: doc.value("task"),
            form_date_time: doc.first_of(&["msgdatetime", "datetime"]),
            is_help_needed: doc.first_of(&["is_help_needed", "emergent"]),
            needed_help: doc.value("neededhelp"),
            city: doc.value("city"),
            county: doc.value("county"),
            state: doc.value("state"),
            territory: doc.value("territory"),
            location: resolve_lat_long(doc, &[]).found(),
            infrastructure,
            additional_comments: doc.first_of(&["additional_comments", "comments"]),
            point_of_contact: doc.value("poc"),
        }
    }
}

impl FormParser for FieldSituationParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::FieldSituation
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::FieldSituation)?;
        Ok(TypedMessage::FieldSituation(Self::read(raw, &doc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_26() {
        let xml = "<RMS_Express_Form><variables>\
<templateversion>FSR 26 v. 2.1</templateversion>\
<title>ACS</title><city>Oakland</city>\
<power_functioning>NO</power_functioning><power_comments>since noon</power_comments>\
<maplat>37.8</maplat><maplon>-122.27</maplon>\
<emergent>YES</emergent>\
</variables></RMS_Express_Form>";
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "FSR")
                .with_attachment("RMS_Express_Form_Field Situation Report 26_viewer.xml", xml),
        );
        let Ok(TypedMessage::FieldSituation(m)) = FieldSituationParser.parse(&raw) else {
            panic!("expected field situation");
        };
        assert_eq!(m.version.as_deref(), Some("2.1"));
        assert_eq!(m.city, "Oakland");
        assert_eq!(m.is_help_needed, "YES");
        assert_eq!(m.location, Some(LatLongPair::new("37.8", "-122.27")));
        let power = m.infrastructure.iter().find(|s| s.service == "Commercial power").unwrap();
        assert_eq!(power.status, "NO");
        assert_eq!(power.comments, "since noon");
    }

    #[test]
    fn test_location_optional() {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "FSR")
                .with_attachment("Field Situation Report_viewer.xml", "<r><city>X</city></r>"),
        );
        let Ok(TypedMessage::FieldSituation(m)) = FieldSituationParser.parse(&raw) else {
            panic!("expected field situation");
        };
        assert!(m.location.is_none());
        assert_eq!(m.infrastructure.len(), INFRASTRUCTURE.len());
    }
}
