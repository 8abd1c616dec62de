//! Water-level ("Pegelstand") reports, sent as `Label: value` text in
//! either German or English.

use std::sync::Arc;

use serde::Serialize;

use super::FormParser;
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::lines::TextFields;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Serialize)]
pub struct WaterLevelMessage {
    pub raw: Arc<RawMessage>,
    pub station: String,
    pub water_body: String,
    /// As written, including the unit (`"312 cm"`).
    pub level: String,
    pub trend: String,
    pub observed: String,
    pub comments: String,
    pub location: Option<LatLongPair>,
}

impl WaterLevelMessage {
    /// Leading number of the level, e.g. `312` for `"312 cm"`.
    pub fn level_value(&self) -> Option<f64> {
        let number: String = self
            .level
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
            .collect();
        number.replace(',', ".").parse().ok()
    }
}

pub struct WaterLevelParser;

impl FormParser for WaterLevelParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::WaterLevel
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
        let fields = TextFields::parse(&body, ':');
        let location = resolve_lat_long(&fields, &["position", "koordinaten"])
            .found()
            .or_else(|| raw.location.clone());

        Ok(TypedMessage::WaterLevel(WaterLevelMessage {
            raw: raw.clone(),
            station: fields.first_of(&["Station", "Messstelle", "Pegel"]),
            water_body: fields.first_of(&["Gewaesser", "Gewässer", "River", "Water Body"]),
            level: fields.first_of(&["Pegelstand", "Wasserstand", "Level", "Water Level"]),
            trend: fields.first_of(&["Tendenz", "Trend"]),
            observed: fields.first_of(&["Zeit", "Datum", "Time", "Date"]),
            comments: fields.first_of(&["Bemerkung", "Comments", "Remarks"]),
            location,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> WaterLevelMessage {
        let raw = Arc::new(RawMessage::new("MID", "DL1ABC", "Pegelstand").with_plain_content(body));
        match WaterLevelParser.parse(&raw) {
            Ok(TypedMessage::WaterLevel(m)) => m,
            other => panic!("expected water level, got {other:?}"),
        }
    }

    #[test]
    fn test_german_labels() {
        let m = parse("Pegel: Köln\nGewässer: Rhein\nPegelstand: 312,5 cm\nTendenz: steigend\nZeit: 14:00\n");
        assert_eq!(m.station, "Köln");
        assert_eq!(m.water_body, "Rhein");
        assert_eq!(m.level_value(), Some(312.5));
        assert_eq!(m.trend, "steigend");
        assert_eq!(m.observed, "14:00");
    }

    #[test]
    fn test_english_labels_and_position() {
        let m = parse("Station: Gauge 4\nLevel: 2.1 m\nTrend: falling\nPosition: 50.94, 6.96\n");
        assert_eq!(m.station, "Gauge 4");
        assert_eq!(m.level, "2.1 m");
        assert_eq!(m.location, Some(LatLongPair::new("50.94", "6.96")));
    }

    #[test]
    fn test_no_location() {
        let m = parse("Pegelstand: n/a\n");
        assert_eq!(m.level_value(), None);
        assert!(m.location.is_none());
    }
}
