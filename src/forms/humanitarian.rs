//! Humanitarian Needs Identification report.

use std::sync::Arc;

use serde::Serialize;

use super::{is_checked, template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::FieldSource;

/// `(category, tag)`; the free-text description lives in `<tag>_desc`.
const NEED_CATEGORIES: &[(&str, &str)] = &[
    ("Health", "health"),
    ("Shelter", "shelter"),
    ("Food", "food"),
    ("Water", "water"),
    ("Logistics", "logistics"),
    ("Other", "other"),
];

#[derive(Debug, Clone, Serialize)]
pub struct HumanitarianNeed {
    pub category: String,
    /// Checkbox value as sent (`Yes`, `true`, or empty).
    pub needed: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HumanitarianNeedsMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub team_id: String,
    pub form_date_time: String,
    pub address: String,
    pub location: Option<LatLongPair>,
    pub needs: Vec<HumanitarianNeed>,
    pub approved_by: String,
}

impl HumanitarianNeedsMessage {
    /// Categories marked as needed.
    pub fn needed_categories(&self) -> impl Iterator<Item = &str> {
        self.needs
            .iter()
            .filter(|n| is_checked(&n.needed))
            .map(|n| n.category.as_str())
    }
}

pub struct HumanitarianNeedsParser;

impl FormParser for HumanitarianNeedsParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::HumanitarianNeeds
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::HumanitarianNeeds)?;
        let needs = NEED_CATEGORIES
            .iter()
            .map(|(category, tag)| HumanitarianNeed {
                category: category.to_string(),
                needed: doc.value(tag),
                description: doc.value(&format!("{tag}_desc")),
            })
            .collect();

        Ok(TypedMessage::HumanitarianNeeds(HumanitarianNeedsMessage {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            team_id: doc.value("teamid"),
            form_date_time: doc.value("datetime"),
            address: doc.value("address"),
            location: resolve_lat_long(&doc, &[]).found(),
            needs,
            approved_by: doc.value("approvedby"),
        }))
    }
}
