//! ICS-213RR Resource Request.
//!
//! Every attachment in the `ICS213RR…` family is handled here except the
//! WebEOC export variant, whose layout is unrelated and is rejected.

use std::sync::Arc;

use serde::Serialize;

use super::{all_empty, numbered_rows, template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::{strip_viewer_prefix, MessageTypeId};
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

/// Line item slots on the form.
pub const MAX_LINE_ITEMS: usize = 8;

const UNSUPPORTED_VARIANT_MARKER: &str = "webeoc";

#[derive(Debug, Clone, Serialize)]
pub struct Ics213RrLineItem {
    pub quantity: String,
    pub kind: String,
    pub resource_type: String,
    pub item: String,
    pub requested_date_time: String,
    pub estimated_date_time: String,
    pub cost: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics213RrMessage {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub incident_name: String,
    pub activity_date_time: String,
    pub request_number: String,
    pub line_items: Vec<Ics213RrLineItem>,
    pub delivery_location: String,
    pub substitutes: String,
    pub requested_by: String,
    pub priority: String,
    pub approved_by: String,
    pub logistics_order_number: String,
    pub supplier_info: String,
    pub supplier_name: String,
    pub supplier_poc: String,
    pub notes: String,
}

pub struct Ics213RrParser;

impl Ics213RrParser {
    fn read(raw: &Arc<RawMessage>, doc: &FormDocument) -> Ics213RrMessage {
        let line_items = numbered_rows(MAX_LINE_ITEMS, |i| {
            let item = Ics213RrLineItem {
                quantity: doc.value(&format!("qty{i}")),
                kind: doc.value(&format!("kind{i}")),
                resource_type: doc.value(&format!("type{i}")),
                item: doc.value(&format!("item{i}")),
                requested_date_time: doc.value(&format!("reqdatetime{i}")),
                estimated_date_time: doc.value(&format!("estdatetime{i}")),
                cost: doc.value(&format!("cost{i}")),
            };
            (!all_empty(&[
                &item.quantity,
                &item.kind,
                &item.resource_type,
                &item.item,
                &item.requested_date_time,
                &item.estimated_date_time,
                &item.cost,
            ]))
            .then_some(item)
        });

        Ics213RrMessage {
            raw: raw.clone(),
            version: template_version(doc),
            organization: doc.value("organization"),
            incident_name: doc.value("incname"),
            activity_date_time: doc.value("datetime"),
            request_number: doc.value("resreqnum"),
            line_items,
            delivery_location: doc.value("delivery"),
            substitutes: doc.value("subs"),
            requested_by: doc.value("requestby"),
            priority: doc.value("priority"),
            approved_by: doc.value("approval"),
            logistics_order_number: doc.value("logorder"),
            supplier_info: doc.value("supplierinfo"),
            supplier_name: doc.value("suppliername"),
            supplier_poc: doc.value("supplierpoc"),
            notes: doc.value("notes"),
        }
    }
}

impl FormParser for Ics213RrParser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics213Rr
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        if let Some(name) = MessageTypeId::Ics213Rr.find_attachment(raw.attachment_names()) {
            if strip_viewer_prefix(name)
                .to_ascii_lowercase()
                .contains(UNSUPPORTED_VARIANT_MARKER)
            {
                return Err(ExtractError::reject(
                    RejectReason::UnsupportedType,
                    format!("unsupported ICS-213RR variant: {name}"),
                ));
            }
        }
        let doc = viewer_document(raw, MessageTypeId::Ics213Rr)?;
        Ok(TypedMessage::Ics213Rr(Self::read(raw, &doc)))
    }
}
