//! Weather reports: the Local Weather and Severe WX viewer forms, and the
//! plain-text hurricane report.

use std::sync::Arc;

use serde::Serialize;

use super::{template_version, viewer_document, FormParser};
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
pub struct WxLocalMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub form_date_time: String,
    pub city: String,
    pub state: String,
    pub county: String,
    pub location: LatLongPair,
    pub temperature: String,
    pub wind_speed: String,
    pub wind_gust: String,
    pub wind_direction: String,
    pub precipitation: String,
    pub humidity: String,
    pub pressure: String,
    pub conditions: String,
    pub comments: String,
}

/// Local weather reports are only useful with a position, so a missing one
/// rejects the message.
pub struct WxLocalParser;

impl FormParser for WxLocalParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::WxLocal
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::WxLocal)?;
        let location = resolve_lat_long(&doc, &[]).require()?;
        Ok(TypedMessage::WxLocal(WxLocalMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            form_date_time: doc.value("datetime"),
            city: doc.value("city"),
            state: doc.value("state"),
            county: doc.value("county"),
            location,
            temperature: doc.value("temperature"),
            wind_speed: doc.value("windspeed"),
            wind_gust: doc.value("windgust"),
            wind_direction: doc.value("winddirection"),
            precipitation: doc.value("precipitation"),
            humidity: doc.value("humidity"),
            pressure: doc.value("pressure"),
            conditions: doc.value("conditions"),
            comments: doc.value("comments"),
        }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WxSevereMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub form_date_time: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub city: String,
    pub region: String,
    pub county: String,
    pub location: Option<LatLongPair>,
    pub flood: String,
    pub hail: String,
    pub high_wind: String,
    pub tornado: String,
    pub damage: String,
    pub snow: String,
    pub other: String,
    pub comments: String,
}

pub struct WxSevereParser;

impl FormParser for WxSevereParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::WxSevere
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::WxSevere)?;
        Ok(TypedMessage::WxSevere(WxSevereMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            form_date_time: doc.value("datetime"),
            contact_name: doc.value("contactname"),
            contact_phone: doc.value("contactphone"),
            city: doc.value("city"),
            region: doc.value("region"),
            county: doc.value("county"),
            location: resolve_lat_long(&doc, &[]).found(),
            flood: doc.value("flood"),
            hail: doc.value("hailsize"),
            high_wind: doc.value("windspeed"),
            tornado: doc.value("tornado"),
            damage: doc.value("winddamage"),
            snow: doc.value("snow"),
            other: doc.value("othertype"),
            comments: doc.value("comments"),
        }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WxHurricaneMessage {
    pub raw: Arc<RawMessage>,
    pub storm_name: String,
    pub observation_date_time: String,
    pub is_observed: String,
    pub location: Option<LatLongPair>,
    pub status: String,
    pub sustained_wind: String,
    pub wind_gusts: String,
    pub pressure: String,
    pub rainfall: String,
    pub comments: String,
}

/// Hurricane reports arrive as `Label: value` text. Some labels differ
/// between the report tools in use, so each field has alternatives.
pub struct WxHurricaneParser;

impl FormParser for WxHurricaneParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::WxHurricane
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
        let fields = TextFields::parse(&body, ':');

        let location = match (fields.optional("Latitude"), fields.optional("Longitude")) {
            (Some(lat), Some(lon)) => Some(LatLongPair::new(lat, lon)).filter(LatLongPair::is_valid),
            _ => None,
        }
        .or_else(|| raw.location.clone());

        Ok(TypedMessage::WxHurricane(WxHurricaneMessage {
            raw: raw.clone(),
            storm_name: fields.first_of(&["Storm Name", "Hurricane"]),
            observation_date_time: fields.first_of(&["Observation Time", "Date/Time", "Time"]),
            is_observed: fields.value("Observed"),
            location,
            status: fields.value("Status"),
            sustained_wind: fields.first_of(&["Sustained Wind", "Wind Speed"]),
            wind_gusts: fields.first_of(&["Wind Gusts", "Gusts"]),
            pressure: fields.first_of(&["Barometric Pressure", "Pressure"]),
            rainfall: fields.value("Rainfall"),
            comments: fields.first_of(&["Comments", "Remarks"]),
        }))
    }
}
