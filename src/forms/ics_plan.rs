//! Incident Action Plan forms: ICS-201 Incident Briefing, ICS-202 Incident
//! Objectives, ICS-203 Organization Assignment List, ICS-204 Assignment
//! List and ICS-208 Safety Message.

use std::sync::Arc;

use serde::Serialize;

use super::ics::IcsHeader;
use super::{all_empty, checked_labels, numbered_rows, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

pub const MAX_BRIEFING_ACTIONS: usize = 12;
pub const MAX_BRIEFING_RESOURCES: usize = 10;
pub const MAX_AGENCY_REPRESENTATIVES: usize = 8;
pub const MAX_ASSIGNED_RESOURCES: usize = 10;
pub const MAX_ASSIGNMENT_CONTACTS: usize = 4;

/// `(position, tag)` for the command and general staff block of ICS-203.
const COMMAND_STAFF: &[(&str, &str)] = &[
    ("Incident Commander", "ic"),
    ("Deputy Incident Commander", "deputy_ic"),
    ("Safety Officer", "safety_officer"),
    ("Public Information Officer", "pio"),
    ("Liaison Officer", "liaison"),
    ("Operations Section Chief", "ops_chief"),
    ("Planning Section Chief", "plans_chief"),
    ("Logistics Section Chief", "log_chief"),
    ("Finance/Admin Section Chief", "fin_chief"),
];

/// `(attachment, checkbox tag)` for the ICS-202 plan attachment list.
const PLAN_ATTACHMENTS: &[(&str, &str)] = &[
    ("ICS 203", "att_203"),
    ("ICS 204", "att_204"),
    ("ICS 205", "att_205"),
    ("ICS 205A", "att_205a"),
    ("ICS 206", "att_206"),
    ("ICS 207", "att_207"),
    ("ICS 208", "att_208"),
    ("Map/Chart", "att_map"),
    ("Weather Forecast/Tides/Currents", "att_weather"),
    ("Other", "att_other"),
];

#[derive(Debug, Clone, Serialize)]
pub struct BriefingAction {
    pub time: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BriefingResource {
    pub resource: String,
    pub identifier: String,
    pub date_time_ordered: String,
    pub eta: String,
    pub arrived: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics201Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub map_sketch: String,
    pub situation_summary: String,
    pub objectives: String,
    pub current_actions: Vec<BriefingAction>,
    pub resources: Vec<BriefingResource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics202Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub objectives: String,
    pub command_emphasis: String,
    pub situational_awareness: String,
    pub site_safety_plan_required: String,
    pub site_safety_plan_location: String,
    /// Plan attachments that were ticked.
    pub attachments: Vec<String>,
    pub approved_by: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionAssignment {
    pub position: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgencyRepresentative {
    pub agency: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics203Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    /// Filled positions only.
    pub staff: Vec<PositionAssignment>,
    pub agency_representatives: Vec<AgencyRepresentative>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignedResourceRow {
    pub identifier: String,
    pub leader: String,
    pub contact: String,
    pub persons: String,
    pub reporting_location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentContact {
    pub name_function: String,
    pub primary_contact: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics204Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub branch: String,
    pub division: String,
    pub group: String,
    pub staging_area: String,
    pub operations_chief: String,
    pub supervisor: String,
    pub resources: Vec<AssignedResourceRow>,
    pub work_assignments: String,
    pub special_instructions: String,
    pub communications: Vec<AssignmentContact>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics208Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub safety_message: String,
    pub site_safety_plan_required: String,
    pub site_safety_plan_location: String,
}

/// One parser for every planning form; `message_type` picks the layout.
pub struct IcsPlanParser {
    message_type: MessageTypeId,
}

impl IcsPlanParser {
    pub fn new(message_type: MessageTypeId) -> Self {
        Self { message_type }
    }
}

impl FormParser for IcsPlanParser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, self.message_type)?;
        let raw = raw.clone();
        let header = IcsHeader::read(&doc);
        Ok(match self.message_type {
            MessageTypeId::Ics201 => TypedMessage::Ics201(Ics201Message {
                raw,
                header,
                map_sketch: doc.value("mapsketch"),
                situation_summary: doc.value("situation"),
                objectives: doc.value("objectives"),
                current_actions: briefing_actions(&doc),
                resources: briefing_resources(&doc),
            }),
            MessageTypeId::Ics202 => TypedMessage::Ics202(Ics202Message {
                raw,
                header,
                objectives: doc.value("objectives"),
                command_emphasis: doc.value("emphasis"),
                situational_awareness: doc.value("awareness"),
                site_safety_plan_required: doc.value("safetyplan"),
                site_safety_plan_location: doc.value("safetyplanloc"),
                attachments: checked_labels(&doc, PLAN_ATTACHMENTS),
                approved_by: doc.value("approvedby"),
            }),
            MessageTypeId::Ics203 => TypedMessage::Ics203(Ics203Message {
                raw,
                header,
                staff: staff(&doc),
                agency_representatives: numbered_rows(MAX_AGENCY_REPRESENTATIVES, |i| {
                    let rep = AgencyRepresentative {
                        agency: doc.value(&format!("agency{i}")),
                        name: doc.value(&format!("agencyrep{i}")),
                    };
                    (!all_empty(&[&rep.agency, &rep.name])).then_some(rep)
                }),
            }),
            MessageTypeId::Ics204 => TypedMessage::Ics204(Ics204Message {
                raw,
                header,
                branch: doc.value("branch"),
                division: doc.value("division"),
                group: doc.value("group"),
                staging_area: doc.value("staging"),
                operations_chief: doc.value("opschief"),
                supervisor: doc.value("supervisor"),
                resources: assigned_resources(&doc),
                work_assignments: doc.value("workassignments"),
                special_instructions: doc.value("instructions"),
                communications: numbered_rows(MAX_ASSIGNMENT_CONTACTS, |i| {
                    let contact = AssignmentContact {
                        name_function: doc.value(&format!("commname{i}")),
                        primary_contact: doc.value(&format!("commcontact{i}")),
                    };
                    (!all_empty(&[&contact.name_function, &contact.primary_contact])).then_some(contact)
                }),
            }),
            _ => TypedMessage::Ics208(Ics208Message {
                raw,
                header,
                safety_message: doc.value("safetymessage"),
                site_safety_plan_required: doc.value("safetyplan"),
                site_safety_plan_location: doc.value("safetyplanloc"),
            }),
        })
    }
}

fn briefing_actions(doc: &FormDocument) -> Vec<BriefingAction> {
    numbered_rows(MAX_BRIEFING_ACTIONS, |i| {
        let action = BriefingAction {
            time: doc.value(&format!("actiontime{i}")),
            action: doc.value(&format!("action{i}")),
        };
        (!all_empty(&[&action.time, &action.action])).then_some(action)
    })
}

fn briefing_resources(doc: &FormDocument) -> Vec<BriefingResource> {
    numbered_rows(MAX_BRIEFING_RESOURCES, |i| {
        let r = BriefingResource {
            resource: doc.value(&format!("resource{i}")),
            identifier: doc.value(&format!("resid{i}")),
            date_time_ordered: doc.value(&format!("resordered{i}")),
            eta: doc.value(&format!("reseta{i}")),
            arrived: doc.value(&format!("resarrived{i}")),
            notes: doc.value(&format!("resnotes{i}")),
        };
        (!all_empty(&[&r.resource, &r.identifier, &r.notes])).then_some(r)
    })
}

fn staff(doc: &FormDocument) -> Vec<PositionAssignment> {
    COMMAND_STAFF
        .iter()
        .filter_map(|(position, tag)| {
            doc.optional(tag).map(|name| PositionAssignment {
                position: position.to_string(),
                name,
            })
        })
        .collect()
}

fn assigned_resources(doc: &FormDocument) -> Vec<AssignedResourceRow> {
    numbered_rows(MAX_ASSIGNED_RESOURCES, |i| {
        let r = AssignedResourceRow {
            identifier: doc.value(&format!("resid{i}")),
            leader: doc.value(&format!("leader{i}")),
            contact: doc.value(&format!("contact{i}")),
            persons: doc.value(&format!("persons{i}")),
            reporting_location: doc.value(&format!("reportloc{i}")),
        };
        (!all_empty(&[&r.identifier, &r.leader, &r.contact])).then_some(r)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message_type: MessageTypeId, attachment: &str, xml: &str) -> TypedMessage {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "IAP").with_attachment(attachment, xml));
        IcsPlanParser::new(message_type).parse(&raw).unwrap()
    }

    #[test]
    fn test_briefing_rows() {
        let xml = "<form><incname>Levee Breach</incname><situation>Water rising</situation>\
<actiontime1>0700</actiontime1><action1>Evacuation ordered</action1>\
<actiontime3>0900</actiontime3><action3>Shelter opened</action3>\
<resource1>Type 1 engine</resource1><resid1>E-51</resid1></form>";
        let TypedMessage::Ics201(m) = parse(MessageTypeId::Ics201, "ICS201_Viewer.xml", xml) else {
            panic!("expected ICS-201");
        };
        assert_eq!(m.header.incident_name, "Levee Breach");
        assert_eq!(m.current_actions.len(), 2);
        assert_eq!(m.current_actions[1].action, "Shelter opened");
        assert_eq!(m.resources[0].identifier, "E-51");
    }

    #[test]
    fn test_objectives_attachments() {
        let xml = "<form><objectives>Protect life</objectives>\
<att_205>Yes</att_205><att_208>true</att_208><att_map>no</att_map></form>";
        let TypedMessage::Ics202(m) = parse(MessageTypeId::Ics202, "RMS_Express_Form_ICS202_Viewer.xml", xml) else {
            panic!("expected ICS-202");
        };
        assert_eq!(m.objectives, "Protect life");
        assert_eq!(m.attachments, vec!["ICS 205", "ICS 208"]);
    }

    #[test]
    fn test_organization_list_skips_empty_positions() {
        let xml = "<form><ic>Chief Ortiz</ic><pio></pio><log_chief>Kim</log_chief>\
<agency1>Red Cross</agency1><agencyrep1>Jo</agencyrep1></form>";
        let TypedMessage::Ics203(m) = parse(MessageTypeId::Ics203, "ICS203_Viewer.xml", xml) else {
            panic!("expected ICS-203");
        };
        let positions: Vec<&str> = m.staff.iter().map(|s| s.position.as_str()).collect();
        assert_eq!(positions, vec!["Incident Commander", "Logistics Section Chief"]);
        assert_eq!(m.agency_representatives[0].agency, "Red Cross");
    }

    #[test]
    fn test_assignment_list() {
        let xml = "<form><division>A</division><resid1>Strike Team 4</resid1><leader1>Dee</leader1>\
<commname1>Div A Sup</commname1><commcontact1>TAC 2</commcontact1></form>";
        let TypedMessage::Ics204(m) = parse(MessageTypeId::Ics204, "ICS204_Viewer.xml", xml) else {
            panic!("expected ICS-204");
        };
        assert_eq!(m.division, "A");
        assert_eq!(m.resources[0].leader, "Dee");
        assert_eq!(m.communications[0].primary_contact, "TAC 2");
    }

    #[test]
    fn test_safety_message() {
        let xml = "<form><safetymessage>Downed lines on Route 9</safetymessage></form>";
        let TypedMessage::Ics208(m) = parse(MessageTypeId::Ics208, "ICS208_Viewer.xml", xml) else {
            panic!("expected ICS-208");
        };
        assert_eq!(m.safety_message, "Downed lines on Route 9");
    }
}
