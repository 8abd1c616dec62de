//! Resource tracking forms: ICS-210 Resource Status Change, ICS-211
//! Check-In List, ICS-215A Safety Analysis, ICS-218 Support Vehicle
//! Inventory and ICS-221 Demobilization Check-Out.

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

pub const MAX_STATUS_CHANGES: usize = 10;
pub const MAX_CHECK_INS: usize = 20;
pub const MAX_HAZARDS: usize = 10;
pub const MAX_VEHICLES: usize = 12;

/// `(unit, checkbox tag)` for the ICS-221 notification block.
const DEMOB_NOTIFIED: &[(&str, &str)] = &[
    ("Supply Unit", "notify_supply"),
    ("Communications Unit", "notify_comms"),
    ("Facilities Unit", "notify_facilities"),
    ("Ground Support Unit", "notify_ground"),
    ("Security", "notify_security"),
    ("Documentation Unit", "notify_docs"),
    ("Finance/Admin Section", "notify_finance"),
];

#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub resource_number: String,
    pub new_status: String,
    pub from_assignment: String,
    pub to_assignment: String,
    pub eta: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics210Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub changes: Vec<StatusChange>,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInEntry {
    pub state: String,
    pub agency: String,
    pub kind: String,
    pub resource_name: String,
    pub leader: String,
    pub total_personnel: String,
    pub contact: String,
    pub departure_point: String,
    pub check_in_date_time: String,
    pub assignment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics211Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub check_in_location: String,
    pub entries: Vec<CheckInEntry>,
}

impl Ics211Message {
    /// Personnel across every entry, ignoring counts that are not numbers.
    pub fn total_personnel(&self) -> u32 {
        self.entries
            .iter()
            .filter_map(|e| e.total_personnel.trim().parse::<u32>().ok())
            .sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HazardRow {
    pub location: String,
    pub hazards: String,
    pub mitigations: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics215AMessage {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub hazards: Vec<HazardRow>,
    pub safety_officer: String,
    pub operations_chief: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportVehicle {
    pub order_number: String,
    pub incident_id: String,
    pub classification: String,
    pub make: String,
    pub license: String,
    pub owner: String,
    pub release_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics218Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub vehicles: Vec<SupportVehicle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics221Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub resource_name: String,
    pub release_date_time: String,
    pub travel_method: String,
    pub destination: String,
    pub notified: Vec<String>,
    pub remarks: String,
}

/// One parser for the resource forms; `message_type` picks the layout.
pub struct IcsResourceParser {
    message_type: MessageTypeId,
}

impl IcsResourceParser {
    pub fn new(message_type: MessageTypeId) -> Self {
        Self { message_type }
    }
}

impl FormParser for IcsResourceParser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, self.message_type)?;
        let raw = raw.clone();
        let header = IcsHeader::read(&doc);
        Ok(match self.message_type {
            MessageTypeId::Ics210 => TypedMessage::Ics210(Ics210Message {
                raw,
                header,
                changes: status_changes(&doc),
                comments: doc.value("comments"),
            }),
            MessageTypeId::Ics211 => TypedMessage::Ics211(Ics211Message {
                raw,
                header,
                check_in_location: doc.value("checkinloc"),
                entries: check_ins(&doc),
            }),
            MessageTypeId::Ics215A => TypedMessage::Ics215A(Ics215AMessage {
                raw,
                header,
                hazards: numbered_rows(MAX_HAZARDS, |i| {
                    let row = HazardRow {
                        location: doc.value(&format!("hazloc{i}")),
                        hazards: doc.value(&format!("hazards{i}")),
                        mitigations: doc.value(&format!("mitigations{i}")),
                    };
                    (!all_empty(&[&row.location, &row.hazards, &row.mitigations])).then_some(row)
                }),
                safety_officer: doc.value("safetyofficer"),
                operations_chief: doc.value("opschief"),
            }),
            MessageTypeId::Ics218 => TypedMessage::Ics218(Ics218Message {
                raw,
                header,
                vehicles: vehicles(&doc),
            }),
            _ => TypedMessage::Ics221(Ics221Message {
                raw,
                header,
                resource_name: doc.value("resource"),
                release_date_time: doc.value("releasedatetime"),
                travel_method: doc.value("travelmethod"),
                destination: doc.value("destination"),
                notified: checked_labels(&doc, DEMOB_NOTIFIED),
                remarks: doc.value("remarks"),
            }),
        })
    }
}

fn status_changes(doc: &FormDocument) -> Vec<StatusChange> {
    numbered_rows(MAX_STATUS_CHANGES, |i| {
        let tag = |name: &str| doc.value(&format!("{name}{i}"));
        let change = StatusChange {
            resource_number: tag("resnum"),
            new_status: tag("newstatus"),
            from_assignment: tag("fromassign"),
            to_assignment: tag("toassign"),
            eta: tag("eta"),
        };
        (!all_empty(&[&change.resource_number, &change.new_status])).then_some(change)
    })
}

fn check_ins(doc: &FormDocument) -> Vec<CheckInEntry> {
    numbered_rows(MAX_CHECK_INS, |i| {
        let tag = |name: &str| doc.value(&format!("{name}{i}"));
        let entry = CheckInEntry {
            state: tag("state"),
            agency: tag("agency"),
            kind: tag("kind"),
            resource_name: tag("resname"),
            leader: tag("leader"),
            total_personnel: tag("personnel"),
            contact: tag("contact"),
            departure_point: tag("departure"),
            check_in_date_time: tag("checkindt"),
            assignment: tag("assignment"),
        };
        (!all_empty(&[&entry.resource_name, &entry.leader, &entry.agency])).then_some(entry)
    })
}

fn vehicles(doc: &FormDocument) -> Vec<SupportVehicle> {
    numbered_rows(MAX_VEHICLES, |i| {
        let tag = |name: &str| doc.value(&format!("{name}{i}"));
        let vehicle = SupportVehicle {
            order_number: tag("order"),
            incident_id: tag("incid"),
            classification: tag("class"),
            make: tag("make"),
            license: tag("license"),
            owner: tag("owner"),
            release_date: tag("release"),
        };
        (!all_empty(&[&vehicle.incident_id, &vehicle.make, &vehicle.license])).then_some(vehicle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message_type: MessageTypeId, attachment: &str, xml: &str) -> TypedMessage {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "resources").with_attachment(attachment, xml));
        IcsResourceParser::new(message_type).parse(&raw).unwrap()
    }

    #[test]
    fn test_status_changes() {
        let xml = "<form><resnum1>E-51</resnum1><newstatus1>Out of service</newstatus1>\
<resnum2>W-7</resnum2><newstatus2>Available</newstatus2><toassign2>Div A</toassign2></form>";
        let TypedMessage::Ics210(m) = parse(MessageTypeId::Ics210, "ICS210_Viewer.xml", xml) else {
            panic!("expected ICS-210");
        };
        assert_eq!(m.changes.len(), 2);
        assert_eq!(m.changes[1].to_assignment, "Div A");
    }

    #[test]
    fn test_check_in_list_personnel() {
        let xml = "<form><checkinloc>Base</checkinloc>\
<resname1>Strike Team 4</resname1><personnel1>5</personnel1>\
<resname2>ARES Team</resname2><personnel2>3</personnel2>\
<resname3>Dozer</resname3><personnel3>one</personnel3></form>";
        let TypedMessage::Ics211(m) = parse(MessageTypeId::Ics211, "ICS211_Viewer.xml", xml) else {
            panic!("expected ICS-211");
        };
        assert_eq!(m.check_in_location, "Base");
        assert_eq!(m.entries.len(), 3);
        assert_eq!(m.total_personnel(), 8);
    }

    #[test]
    fn test_safety_analysis() {
        let xml = "<form><hazloc1>Div B</hazloc1><hazards1>Downed lines</hazards1><mitigations1>Spotters</mitigations1></form>";
        let TypedMessage::Ics215A(m) = parse(MessageTypeId::Ics215A, "ICS215A_Viewer.xml", xml) else {
            panic!("expected ICS-215A");
        };
        assert_eq!(m.hazards.len(), 1);
        assert_eq!(m.hazards[0].mitigations, "Spotters");
    }

    #[test]
    fn test_vehicle_inventory() {
        let xml = "<form><incid1>BUS-2</incid1><make1>Bluebird</make1><license2>7ABC123</license2></form>";
        let TypedMessage::Ics218(m) = parse(MessageTypeId::Ics218, "ICS218_Viewer.xml", xml) else {
            panic!("expected ICS-218");
        };
        assert_eq!(m.vehicles.len(), 2);
        assert_eq!(m.vehicles[1].license, "7ABC123");
    }

    #[test]
    fn test_demobilization_notifications() {
        let xml = "<form><resource>Strike Team 4</resource><notify_comms>Yes</notify_comms>\
<notify_supply>X</notify_supply><notify_security>no</notify_security></form>";
        let TypedMessage::Ics221(m) = parse(MessageTypeId::Ics221, "ICS221_Viewer.xml", xml) else {
            panic!("expected ICS-221");
        };
        assert_eq!(m.resource_name, "Strike Team 4");
        assert_eq!(m.notified, vec!["Supply Unit", "Communications Unit"]);
    }
}
