//! SPOTREP spot report, organized around the SALUTE fields (size, activity,
//! location, unit, time, equipment).

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
pub struct SpotrepMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub precedence: String,
    pub form_date_time: String,
    pub form_to: String,
    pub form_from: String,
    pub city: String,
    pub state: String,
    pub size: String,
    pub activity: String,
    pub reported_location: String,
    pub unit: String,
    pub observed_time: String,
    pub equipment: String,
    pub location: Option<LatLongPair>,
    pub assessment: String,
    pub narrative: String,
    pub authority: String,
    pub point_of_contact: String,
}

pub struct SpotrepParser;

impl FormParser for SpotrepParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Spotrep
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Spotrep)?;
        Ok(TypedMessage::Spotrep(SpotrepMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            precedence: doc.value("precedence"),
            form_date_time: doc.value("datetime"),
            form_to: doc.value("to"),
            form_from: doc.value("from"),
            city: doc.value("city"),
            state: doc.value("state"),
            size: doc.value("size"),
            activity: doc.value("activity"),
            reported_location: doc.value("location"),
            unit: doc.value("unit"),
            observed_time: doc.value("time"),
            equipment: doc.value("equipment"),
            location: resolve_lat_long(&doc, &[]).found(),
            assessment: doc.value("assessment"),
            narrative: doc.value("narrative"),
            authority: doc.value("authority"),
            point_of_contact: doc.value("poc"),
        }))
    }
}
