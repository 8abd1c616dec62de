//! Welfare traffic: RRI Quick Welfare (plain text) and the Welfare
//! Bulletin Board form.

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
use crate::toolkit::lines::{split_lines, TextFields};
use crate::toolkit::FieldSource;

/// Quick welfare bodies mark each chosen status line with this prefix.
const CHECKED_PREFIXES: [&str; 3] = ["[X]", "[x]", "(X)"];

#[derive(Debug, Clone, Serialize)]
pub struct QuickWelfareMessage {
    pub raw: Arc<RawMessage>,
    pub name: String,
    pub location_text: String,
    /// Status statements the sender ticked.
    pub statuses: Vec<String>,
    pub message: String,
}

pub struct QuickWelfareParser;

impl FormParser for QuickWelfareParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::RriQuickWelfare
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let body = raw
            .body_text()
            .map_err(|e| ExtractError::reject(RejectReason::CantParseMime, e.to_string()))?;
        let fields = TextFields::parse(&body, ':');
        let statuses = split_lines(&body)
            .into_iter()
            .filter_map(|line| {
                let line = line.trim();
                CHECKED_PREFIXES
                    .iter()
                    .find_map(|p| line.strip_prefix(p))
                    .map(|rest| rest.trim().to_string())
            })
            .collect();

        Ok(TypedMessage::RriQuickWelfare(QuickWelfareMessage {
            raw: raw.clone(),
            name: fields.first_of(&["Name", "From"]),
            location_text: fields.value("Location"),
            statuses,
            message: fields.first_of(&["Message", "Comments"]),
        }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WelfareBulletinBoardMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub full_name: String,
    pub status: String,
    pub form_date_time: String,
    pub location_text: String,
    pub location: Option<LatLongPair>,
    pub message: String,
}

pub struct WelfareBulletinBoardParser;

impl FormParser for WelfareBulletinBoardParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::WelfareBulletinBoard
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::WelfareBulletinBoard)?;
        Ok(TypedMessage::WelfareBulletinBoard(WelfareBulletinBoardMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            full_name: doc.value("fullname"),
            status: doc.value("status"),
            form_date_time: doc.value("datetime"),
            location_text: doc.value("locationtext"),
            location: resolve_lat_long(&doc, &[]).found(),
            message: doc.value("message"),
        }))
    }
}
