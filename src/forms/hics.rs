//! Hospital Incident Command System forms: HICS-251 Facility System
//! Status, HICS-253 Volunteer Registration, HICS-254 Disaster Victim/Patient
//! Tracking, HICS-255 Master Patient Evacuation Tracking, HICS-257 Resource
//! Accounting Record and HICS-260 Patient Evacuation Tracking.
//!
//! HICS-213, HICS-214 and HICS-259 have their own modules because they
//! share a layout with an ICS form or carry bed counts.

use std::sync::Arc;

use serde::Serialize;

use super::ics::IcsHeader;
use super::{all_empty, numbered_rows, viewer_document, FormParser};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::xml::FormDocument;
use crate::toolkit::FieldSource;

pub const MAX_VOLUNTEERS: usize = 20;
pub const MAX_PATIENTS: usize = 20;
pub const MAX_RESOURCES: usize = 15;

/// `(system, tag)` rows of the HICS-251 status table. Each tag is read with
/// `_status` and `_comments` suffixes.
const FACILITY_SYSTEMS: &[(&str, &str)] = &[
    ("Electrical power", "power"),
    ("Emergency generator", "generator"),
    ("Water", "water"),
    ("Sewer", "sewer"),
    ("Medical gases", "medgas"),
    ("HVAC", "hvac"),
    ("Elevators", "elevators"),
    ("Fire alarm", "firealarm"),
    ("Telephone", "phone"),
    ("Internet", "internet"),
    ("Radio", "radio"),
];

#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub system: String,
    /// `Fully functional`, `Partially functional` or `Nonfunctional`.
    pub status: String,
    pub comments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics251Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub facility_name: String,
    pub systems: Vec<SystemStatus>,
}

impl Hics251Message {
    /// Systems reported as anything other than fully functional.
    pub fn degraded(&self) -> impl Iterator<Item = &SystemStatus> {
        self.systems
            .iter()
            .filter(|s| !s.status.trim().eq_ignore_ascii_case("fully functional"))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Volunteer {
    pub name: String,
    pub license: String,
    pub specialty: String,
    pub assignment: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics253Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub volunteers: Vec<Volunteer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedPatient {
    pub patient_id: String,
    pub name: String,
    pub triage: String,
    pub location: String,
    pub disposition: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics254Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub area: String,
    pub patients: Vec<TrackedPatient>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvacuatedPatient {
    pub patient_id: String,
    pub name: String,
    pub evacuation_priority: String,
    pub destination: String,
    pub transport: String,
    pub departure_time: String,
    pub arrival_confirmed: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics255Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub patients: Vec<EvacuatedPatient>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceRecord {
    pub date_time: String,
    pub description: String,
    pub quantity: String,
    pub received_from: String,
    pub issued_to: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics257Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub resources: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hics260Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub patient_name: String,
    pub patient_id: String,
    pub date_of_birth: String,
    pub diagnosis: String,
    pub isolation: String,
    pub evacuation_priority: String,
    pub sending_facility: String,
    pub receiving_facility: String,
    pub transport: String,
    pub departure_time: String,
    pub family_notified: String,
}

/// One parser for the hospital tracking forms; `message_type` picks the layout.
pub struct HicsParser {
    message_type: MessageTypeId,
}

impl HicsParser {
    pub fn new(message_type: MessageTypeId) -> Self {
        Self { message_type }
    }
}

impl FormParser for HicsParser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, self.message_type)?;
        let raw = raw.clone();
        let header = IcsHeader::read(&doc);
        Ok(match self.message_type {
            MessageTypeId::Hics251 => TypedMessage::Hics251(Hics251Message {
                raw,
                header,
                facility_name: doc.first_of(&["facility", "facilityname"]),
                systems: systems(&doc),
            }),
            MessageTypeId::Hics253 => TypedMessage::Hics253(Hics253Message {
                raw,
                header,
                volunteers: numbered_rows(MAX_VOLUNTEERS, |i| {
                    let tag = |name: &str| doc.value(&format!("{name}{i}"));
                    let v = Volunteer {
                        name: tag("volname"),
                        license: tag("license"),
                        specialty: tag("specialty"),
                        assignment: tag("assignment"),
                    };
                    (!all_empty(&[&v.name, &v.license])).then_some(v)
                }),
            }),
            MessageTypeId::Hics254 => TypedMessage::Hics254(Hics254Message {
                raw,
                header,
                area: doc.value("area"),
                patients: tracked_patients(&doc),
            }),
            MessageTypeId::Hics255 => TypedMessage::Hics255(Hics255Message {
                raw,
                header,
                patients: evacuated_patients(&doc),
            }),
            MessageTypeId::Hics257 => TypedMessage::Hics257(Hics257Message {
                raw,
                header,
                resources: numbered_rows(MAX_RESOURCES, |i| {
                    let tag = |name: &str| doc.value(&format!("{name}{i}"));
                    let r = ResourceRecord {
                        date_time: tag("datetime"),
                        description: tag("description"),
                        quantity: tag("qty"),
                        received_from: tag("receivedfrom"),
                        issued_to: tag("issuedto"),
                    };
                    (!all_empty(&[&r.description, &r.quantity])).then_some(r)
                }),
            }),
            _ => TypedMessage::Hics260(Hics260Message {
                raw,
                header,
                patient_name: doc.value("patientname"),
                patient_id: doc.value("patientid"),
                date_of_birth: doc.value("dob"),
                diagnosis: doc.value("diagnosis"),
                isolation: doc.value("isolation"),
                evacuation_priority: doc.value("priority"),
                sending_facility: doc.value("sending"),
                receiving_facility: doc.value("receiving"),
                transport: doc.value("transport"),
                departure_time: doc.value("departure"),
                family_notified: doc.value("familynotified"),
            }),
        })
    }
}

fn systems(doc: &FormDocument) -> Vec<SystemStatus> {
    FACILITY_SYSTEMS
        .iter()
        .filter_map(|(system, tag)| {
            let status = doc.value(&format!("{tag}_status"));
            let comments = doc.value(&format!("{tag}_comments"));
            (!all_empty(&[&status, &comments])).then(|| SystemStatus {
                system: system.to_string(),
                status,
                comments,
            })
        })
        .collect()
}

fn tracked_patients(doc: &FormDocument) -> Vec<TrackedPatient> {
    numbered_rows(MAX_PATIENTS, |i| {
        let tag = |name: &str| doc.value(&format!("{name}{i}"));
        let p = TrackedPatient {
            patient_id: tag("patientid"),
            name: tag("patientname"),
            triage: tag("triage"),
            location: tag("location"),
            disposition: tag("disposition"),
            time: tag("time"),
        };
        (!all_empty(&[&p.patient_id, &p.name])).then_some(p)
    })
}

fn evacuated_patients(doc: &FormDocument) -> Vec<EvacuatedPatient> {
    numbered_rows(MAX_PATIENTS, |i| {
        let tag = |name: &str| doc.value(&format!("{name}{i}"));
        let p = EvacuatedPatient {
            patient_id: tag("patientid"),
            name: tag("patientname"),
            evacuation_priority: tag("priority"),
            destination: tag("destination"),
            transport: tag("transport"),
            departure_time: tag("departure"),
            arrival_confirmed: tag("arrived"),
        };
        (!all_empty(&[&p.patient_id, &p.name])).then_some(p)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(message_type: MessageTypeId, attachment: &str, xml: &str) -> TypedMessage {
        let raw = Arc::new(RawMessage::new("MID", "K1ABC", "HICS").with_attachment(attachment, xml));
        HicsParser::new(message_type).parse(&raw).unwrap()
    }

    #[test]
    fn test_facility_status_degraded() {
        let xml = "<form><facility>Mercy General</facility>\
<power_status>Partially functional</power_status><power_comments>On generator</power_comments>\
<water_status>Fully functional</water_status>\
<radio_status>Nonfunctional</radio_status></form>";
        let TypedMessage::Hics251(m) = parse(MessageTypeId::Hics251, "HICS 251_viewer.xml", xml) else {
            panic!("expected HICS-251");
        };
        assert_eq!(m.facility_name, "Mercy General");
        assert_eq!(m.systems.len(), 3);
        let degraded: Vec<&str> = m.degraded().map(|s| s.system.as_str()).collect();
        assert_eq!(degraded, vec!["Electrical power", "Radio"]);
    }

    #[test]
    fn test_volunteers() {
        let xml = "<form><volname1>Dr. Ruiz</volname1><specialty1>ER</specialty1><volname3>N. Park</volname3></form>";
        let TypedMessage::Hics253(m) = parse(MessageTypeId::Hics253, "HICS 253_viewer.xml", xml) else {
            panic!("expected HICS-253");
        };
        assert_eq!(m.volunteers.len(), 2);
        assert_eq!(m.volunteers[0].specialty, "ER");
    }

    #[test]
    fn test_patient_tracking() {
        let xml = "<form><area>ED</area><patientid1>P-100</patientid1><triage1>Red</triage1></form>";
        let TypedMessage::Hics254(m) = parse(MessageTypeId::Hics254, "HICS 254_viewer.xml", xml) else {
            panic!("expected HICS-254");
        };
        assert_eq!(m.area, "ED");
        assert_eq!(m.patients[0].triage, "Red");
    }

    #[test]
    fn test_master_evacuation() {
        let xml = "<form><patientid1>P-1</patientid1><destination1>County</destination1>\
<patientname2>J. Doe</patientname2><transport2>ALS</transport2></form>";
        let TypedMessage::Hics255(m) = parse(MessageTypeId::Hics255, "HICS 255_viewer.xml", xml) else {
            panic!("expected HICS-255");
        };
        assert_eq!(m.patients.len(), 2);
        assert_eq!(m.patients[1].transport, "ALS");
    }

    #[test]
    fn test_resource_accounting() {
        let xml = "<form><description1>Cots</description1><qty1>40</qty1><issuedto1>Shelter</issuedto1></form>";
        let TypedMessage::Hics257(m) = parse(MessageTypeId::Hics257, "HICS 257_viewer.xml", xml) else {
            panic!("expected HICS-257");
        };
        assert_eq!(m.resources[0].quantity, "40");
    }

    #[test]
    fn test_single_patient_evacuation() {
        let xml = "<form><patientname>A. Lee</patientname><receiving>St. Mary</receiving><priority>2</priority></form>";
        let TypedMessage::Hics260(m) = parse(MessageTypeId::Hics260, "HICS 260_viewer.xml", xml) else {
            panic!("expected HICS-260");
        };
        assert_eq!(m.patient_name, "A. Lee");
        assert_eq!(m.receiving_facility, "St. Mary");
        assert_eq!(m.evacuation_priority, "2");
    }
}
