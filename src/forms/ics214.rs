//! ICS-214 Activity Log and its HICS-214 counterpart.

use std::sync::Arc;

use serde::Serialize;

use super::{all_empty, numbered_rows, template_version, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

pub const MAX_RESOURCES: usize = 8;
pub const MAX_ACTIVITIES: usize = 24;

#[derive(Debug, Clone, Serialize)]
pub struct AssignedResource {
    pub name: String,
    pub ics_position: String,
    pub home_agency: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub date_time: String,
    pub notable_activities: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics214Message {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub incident_name: String,
    pub operational_period_from: String,
    pub operational_period_to: String,
    pub name: String,
    pub ics_position: String,
    pub home_agency: String,
    pub resources: Vec<AssignedResource>,
    pub activities: Vec<ActivityEntry>,
    pub prepared_by: String,
    pub prepared_position: String,
    pub prepared_date_time: String,
}

pub struct Ics214Parser {
    message_type: MessageTypeId,
}

impl Ics214Parser {
    /// `message_type` is [`MessageTypeId::Ics214`] or [`MessageTypeId::Hics214`].
    pub fn new(message_type: MessageTypeId) -> Self {
        Self { message_type }
    }
}

fn read(raw: &Arc<RawMessage>, doc: &FormDocument) -> Ics214Message {
    let resources = numbered_rows(MAX_RESOURCES, |i| {
        let r = AssignedResource {
            name: doc.value(&format!("resname{i}")),
            ics_position: doc.value(&format!("respos{i}")),
            home_agency: doc.value(&format!("resagency{i}")),
        };
        (!all_empty(&[&r.name, &r.ics_position, &r.home_agency])).then_some(r)
    });
    let activities = numbered_rows(MAX_ACTIVITIES, |i| {
        let a = ActivityEntry {
            date_time: doc.value(&format!("activitydatetime{i}")),
            notable_activities: doc.value(&format!("activities{i}")),
        };
        (!all_empty(&[&a.date_time, &a.notable_activities])).then_some(a)
    });

    Ics214Message {
        raw: raw.clone(),
        version: template_version(doc),
        organization: doc.value("organization"),
        incident_name: doc.value("incname"),
        operational_period_from: doc.value("opfrom"),
        operational_period_to: doc.value("opto"),
        name: doc.value("name"),
        ics_position: doc.value("icsposition"),
        home_agency: doc.value("homeagency"),
        resources,
        activities,
        prepared_by: doc.value("prepname"),
        prepared_position: doc.value("preppos"),
        prepared_date_time: doc.value("prepdatetime"),
    }
}

impl FormParser for Ics214Parser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, self.message_type)?;
        let message = read(raw, &doc);
        Ok(match self.message_type {
            MessageTypeId::Hics214 => TypedMessage::Hics214(message),
            _ => TypedMessage::Ics214(message),
        })
    }
}
