//! "Did You Feel It?" earthquake reports.
//!
//! The body carries a JSON object between `--- BEGIN json ---` and
//! `--- END json ---` lines.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FormParser;
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;
use crate::toolkit::json::{between_markers, from_block, DYFI_BEGIN_MARKER, DYFI_END_MARKER};

/// The questionnaire as sent. Numbers and strings are mixed freely, so
/// values are kept as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DyfiReport {
    #[serde(default, alias = "eventid")]
    pub event_id: Option<Value>,
    #[serde(default, alias = "fldSituation_felt")]
    pub felt: Option<Value>,
    #[serde(default, alias = "fldEffects_shaking")]
    pub shaking: Option<Value>,
    #[serde(default, alias = "fldEffects_damage")]
    pub damage: Option<Value>,
    #[serde(default, alias = "ciim_mapLat")]
    pub latitude: Option<Value>,
    #[serde(default, alias = "ciim_mapLon")]
    pub longitude: Option<Value>,
    #[serde(default, alias = "ciim_time")]
    pub time: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DyfiMessage {
    pub raw: Arc<RawMessage>,
    pub report: DyfiReport,
    /// From the report when it carries a valid position, else the header.
    pub location: Option<LatLongPair>,
}

fn json_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub struct DyfiParser;

impl FormParser for DyfiParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Dyfi
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
        let block = between_markers(&body, DYFI_BEGIN_MARKER, DYFI_END_MARKER)
            .map_err(|missing| ExtractError::reject(RejectReason::CantParseDyfiJson, missing))?;
        let report: DyfiReport = from_block(block)
            .map_err(|e| ExtractError::reject(RejectReason::CantParseDyfiJson, e.to_string()))?;

        let location = match (json_text(&report.latitude), json_text(&report.longitude)) {
            (Some(lat), Some(lon)) => Some(LatLongPair::new(lat, lon)).filter(LatLongPair::is_valid),
            _ => None,
        }
        .or_else(|| raw.location.clone());

        Ok(TypedMessage::Dyfi(DyfiMessage {
            raw: raw.clone(),
            report,
            location,
        }))
    }
}
