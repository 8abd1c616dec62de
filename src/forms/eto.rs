//! Emergency Traffic Operations (ETO) check-in and resume messages.
//!
//! The ETO tools put one JSON object in the body, possibly surrounded by
//! free text.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FormParser;
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;
use crate::toolkit::json::{braced_object, from_block, lenient_text};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtoCheckIn {
    #[serde(deserialize_with = "lenient_text")]
    pub call: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub city: String,
    #[serde(deserialize_with = "lenient_text")]
    pub county: String,
    #[serde(deserialize_with = "lenient_text")]
    pub state: String,
    #[serde(deserialize_with = "lenient_text")]
    pub band: String,
    #[serde(deserialize_with = "lenient_text")]
    pub mode: String,
    #[serde(deserialize_with = "lenient_text")]
    pub grid: String,
    #[serde(deserialize_with = "lenient_text")]
    pub comments: String,
    #[serde(deserialize_with = "lenient_text")]
    pub version: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EtoResume {
    #[serde(deserialize_with = "lenient_text")]
    pub call: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub state: String,
    #[serde(deserialize_with = "lenient_text")]
    pub experience: String,
    #[serde(deserialize_with = "lenient_text")]
    pub equipment: String,
    #[serde(deserialize_with = "lenient_text")]
    pub modes: String,
    #[serde(deserialize_with = "lenient_text")]
    pub availability: String,
    #[serde(deserialize_with = "lenient_text")]
    pub version: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EtoCheckInMessage {
    pub raw: Arc<RawMessage>,
    pub payload: EtoCheckIn,
}

#[derive(Debug, Clone, Serialize)]
pub struct EtoResumeMessage {
    pub raw: Arc<RawMessage>,
    pub payload: EtoResume,
}

/// Find and deserialize the body's JSON object.
fn payload<T: DeserializeOwned>(raw: &RawMessage) -> Result<T, ExtractError> {
    let body = raw
        .body_text()
        .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
    let block = braced_object(&body)
        .ok_or_else(|| ExtractError::reject(RejectReason::CantParseEtoJson, "no JSON object in body"))?;
    from_block(block).map_err(|e| ExtractError::reject(RejectReason::CantParseEtoJson, e.to_string()))
}

pub struct EtoCheckInParser;

impl FormParser for EtoCheckInParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::EtoCheckIn
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        Ok(TypedMessage::EtoCheckIn(EtoCheckInMessage {
            raw: raw.clone(),
            payload: payload(raw)?,
        }))
    }
}

pub struct EtoResumeParser;

impl FormParser for EtoResumeParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::EtoResume
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        Ok(TypedMessage::EtoResume(EtoResumeMessage {
            raw: raw.clone(),
            payload: payload(raw)?,
        }))
    }
}
