//! SKYWARN spotter report.

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
pub struct SkywarnReportMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub spotter_id: String,
    pub event_date_time: String,
    pub location: LatLongPair,
    pub location_text: String,
    pub event_type: String,
    pub hail_size: String,
    pub wind_speed: String,
    pub wind_measured: String,
    pub rain_amount: String,
    pub snow_depth: String,
    pub flooding: String,
    pub damage: String,
    pub injuries: String,
    pub comments: String,
}

/// Spotter reports are plotted, so a report with no position is rejected.
pub struct SkywarnReportParser;

impl FormParser for SkywarnReportParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::SkywarnReport
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::SkywarnReport)?;
        let location = resolve_lat_long(&doc, &["event", "report"]).require()?;
        Ok(TypedMessage::SkywarnReport(SkywarnReportMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            spotter_id: doc.first_of(&["spotterid", "spotter"]),
            event_date_time: doc.value("eventdatetime"),
            location,
            location_text: doc.value("locationtext"),
            event_type: doc.value("eventtype"),
            hail_size: doc.value("hailsize"),
            wind_speed: doc.value("windspeed"),
            wind_measured: doc.value("windmeasured"),
            rain_amount: doc.value("rain"),
            snow_depth: doc.value("snow"),
            flooding: doc.value("flooding"),
            damage: doc.value("damage"),
            injuries: doc.value("injuries"),
            comments: doc.value("comments"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reject::RejectReason;

    fn message(xml: &str) -> Arc<RawMessage> {
        Arc::new(RawMessage::new("MID", "K1ABC", "SKYWARN").with_attachment("SKYWARN Report_viewer.xml", xml))
    }

    #[test]
    fn test_event_location_first() {
        let raw = message(
            "<form><spotterid>DES-14</spotterid><eventtype>Hail</eventtype><hailsize>1.75</hailsize>\
<eventlat>44.1</eventlat><eventlon>-121.2</eventlon><maplat>45.0</maplat><maplon>-122.0</maplon></form>",
        );
        let Ok(TypedMessage::SkywarnReport(m)) = SkywarnReportParser.parse(&raw) else {
            panic!("expected SKYWARN report");
        };
        assert_eq!(m.spotter_id, "DES-14");
        assert_eq!(m.hail_size, "1.75");
        assert_eq!(m.location, LatLongPair::new("44.1", "-121.2"));
    }

    #[test]
    fn test_missing_location_rejects() {
        let rejection = SkywarnReportParser.parse(&message("<form><eventtype>Wind</eventtype></form>")).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseLatLong);
        assert!(rejection.context.contains("eventlat"));
    }
}
