//! ICS-209 Incident Status Summary.

use std::sync::Arc;

use serde::Serialize;

use super::ics::IcsHeader;
use super::{viewer_document, FormParser, ParserContext};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::datetime::DateTimeField;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Serialize)]
pub struct StructureCounts {
    pub threatened: String,
    pub damaged: String,
    pub destroyed: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics209Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub incident_number: String,
    /// `Initial`, `Update` or `Final`.
    pub report_version: String,
    pub report_number: String,
    pub incident_commander: String,
    pub incident_management_organization: String,
    pub incident_start: DateTimeField,
    pub current_size: String,
    pub percent_contained: String,
    pub complexity: String,
    pub location_text: String,
    pub location: Option<LatLongPair>,
    pub significant_events: String,
    pub weather_concerns: String,
    pub projected_activity: String,
    pub structures: StructureCounts,
    pub remarks: String,
}

pub struct Ics209Parser {
    context: Arc<ParserContext>,
}

impl Ics209Parser {
    pub fn new(context: Arc<ParserContext>) -> Self {
        Self { context }
    }
}

impl FormParser for Ics209Parser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics209
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Ics209)?;
        let incident_start = self
            .context
            .date_time("Incident Start Date/Time", DateTimeField::winlink(doc.value("startdatetime")))?;

        Ok(TypedMessage::Ics209(Ics209Message {
            raw: raw.clone(),
            header: IcsHeader::read(&doc),
            incident_number: doc.value("incnumber"),
            report_version: doc.value("reportversion"),
            report_number: doc.value("reportnumber"),
            incident_commander: doc.value("ic"),
            incident_management_organization: doc.value("imo"),
            incident_start,
            current_size: doc.value("size"),
            percent_contained: doc.value("contained"),
            complexity: doc.value("complexity"),
            location_text: doc.value("locationtext"),
            location: resolve_lat_long(&doc, &["incident"]).found(),
            significant_events: doc.value("events"),
            weather_concerns: doc.value("weather"),
            projected_activity: doc.value("projected"),
            structures: StructureCounts {
                threatened: doc.value("structthreatened"),
                damaged: doc.value("structdamaged"),
                destroyed: doc.value("structdestroyed"),
            },
            remarks: doc.value("remarks"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reject::RejectReason;

    fn message(start: &str) -> Arc<RawMessage> {
        let xml = format!(
            "<form><incname>Ridge Fire</incname><reportversion>Update</reportversion>\
<startdatetime>{start}</startdatetime><incidentlat>39.1</incidentlat><incidentlon>-120.9</incidentlon>\
<contained>40%</contained><structthreatened>120</structthreatened></form>"
        );
        Arc::new(RawMessage::new("MID", "K1ABC", "209").with_attachment("ICS209_Viewer.xml", xml))
    }

    #[test]
    fn test_status_summary() {
        let parser = Ics209Parser::new(Arc::new(ParserContext::new()));
        let Ok(TypedMessage::Ics209(m)) = parser.parse(&message("2024-08-01 13:45")) else {
            panic!("expected ICS-209");
        };
        assert_eq!(m.report_version, "Update");
        assert!(m.incident_start.parsed.is_some());
        assert_eq!(m.location, Some(LatLongPair::new("39.1", "-120.9")));
        assert_eq!(m.structures.threatened, "120");
    }

    #[test]
    fn test_start_time_policy() {
        let lenient = Ics209Parser::new(Arc::new(ParserContext::new()));
        assert!(lenient.parse(&message("yesterday")).is_ok());

        let strict = Ics209Parser::new(Arc::new(ParserContext::new().with_strict_parsing(true)));
        let rejection = strict.parse(&message("yesterday")).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseDateTime);
        assert!(rejection.context.contains("Incident Start Date/Time"));
    }
}
