//! Position reports: a plain body with `LATITUDE:` and `LONGITUDE:` lines.

use std::sync::Arc;

use serde::Serialize;

use super::FormParser;
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;
use crate::toolkit::lines::{field_after, split_lines};

pub const LATITUDE_LABEL: &str = "LATITUDE:";
pub const LONGITUDE_LABEL: &str = "LONGITUDE:";
pub const COMMENT_LABEL: &str = "COMMENT:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    Body,
    Header,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionMessage {
    pub raw: Arc<RawMessage>,
    pub location: LatLongPair,
    pub source: PositionSource,
    pub comment: String,
}

pub struct PositionParser;

impl FormParser for PositionParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Position
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
        let lines = split_lines(&body);

        let from_body = match (field_after(&lines, LATITUDE_LABEL), field_after(&lines, LONGITUDE_LABEL)) {
            (Some(lat), Some(lon)) => parse_coordinate_pair(&lat, &lon),
            _ => None,
        };

        let (location, source) = match (from_body, raw.location.clone()) {
            (Some(pair), _) => (pair, PositionSource::Body),
            (None, Some(pair)) if pair.is_valid() => (pair, PositionSource::Header),
            _ => {
                return Err(ExtractError::reject(
                    RejectReason::CantParseLatLong,
                    format!("couldn't find lat/long within lines: {LATITUDE_LABEL}, {LONGITUDE_LABEL}, or X-Location header"),
                ))
            }
        };

        Ok(TypedMessage::Position(PositionMessage {
            raw: raw.clone(),
            location,
            source,
            comment: field_after(&lines, COMMENT_LABEL).unwrap_or_default(),
        }))
    }
}

/// Accepts signed decimals (`-122.3`) and hemisphere suffixes (`122.3W`).
fn parse_coordinate_pair(lat: &str, lon: &str) -> Option<LatLongPair> {
    let plain = LatLongPair::new(lat, lon);
    if plain.is_valid() {
        return Some(plain);
    }
    LatLongPair::from_hemisphere(&format!("{lat}, {lon}")).filter(LatLongPair::is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::location::LocationSource;

    #[test]
    fn test_body_position() {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "POSITION REPORT").with_plain_content(
            "LATITUDE: 47.6\nLONGITUDE: -122.3\nCOMMENT: portable at the EOC\n",
        ));
        let TypedMessage::Position(p) = PositionParser.parse(&raw).unwrap() else {
            panic!("expected position");
        };
        assert_eq!(p.location, LatLongPair::new("47.6", "-122.3"));
        assert_eq!(p.source, PositionSource::Body);
        assert_eq!(p.comment, "portable at the EOC");
    }

    #[test]
    fn test_hemisphere_lines() {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "POSITION REPORT")
                .with_plain_content("LATITUDE: 47.6N\nLONGITUDE: 122.3W\n"),
        );
        let TypedMessage::Position(p) = PositionParser.parse(&raw).unwrap() else {
            panic!("expected position");
        };
        assert_eq!(p.location, LatLongPair::new("47.6", "-122.3"));
    }

    #[test]
    fn test_falls_back_to_header() {
        let raw = Arc::new(
            RawMessage::new("MID", "K1ABC", "POSITION REPORT")
                .with_plain_content("LATITUDE: ??\n")
                .with_location(LatLongPair::new("10", "20"), LocationSource::Gps),
        );
        let TypedMessage::Position(p) = PositionParser.parse(&raw).unwrap() else {
            panic!("expected position");
        };
        assert_eq!(p.source, PositionSource::Header);
    }

    #[test]
    fn test_no_position_rejected() {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "POSITION REPORT").with_plain_content("nothing"));
        let rejection = PositionParser.parse(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseLatLong);
        assert!(rejection.context.contains(LATITUDE_LABEL));
    }
}
