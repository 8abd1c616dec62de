//! ICS-206 Medical Plan.

use std::sync::Arc;

use serde::Serialize;

use super::ics::IcsHeader;
use super::{all_empty, is_checked, numbered_rows, viewer_document, FormParser, ParserContext};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::FieldSource;

pub const MAX_AID_STATIONS: usize = 5;
pub const MAX_AMBULANCES: usize = 5;
pub const MAX_HOSPITALS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct MedicalAidStation {
    pub name: String,
    pub location: String,
    pub contact: String,
    pub paramedics_on_site: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmbulanceService {
    pub name: String,
    pub location: String,
    pub contact: String,
    /// `ALS` or `BLS`.
    pub level_of_service: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hospital {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub travel_time_air: String,
    pub travel_time_ground: String,
    pub trauma_center: String,
    pub burn_center: bool,
    pub helipad: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics206Message {
    pub raw: Arc<RawMessage>,
    #[serde(flatten)]
    pub header: IcsHeader,
    pub aid_stations: Vec<MedicalAidStation>,
    pub ambulances: Vec<AmbulanceService>,
    pub hospitals: Vec<Hospital>,
    pub emergency_procedures: String,
    pub approved_by: String,
    /// IAP page, numeric unless the lenient policy kept a raw value.
    pub iap_page: String,
}

pub struct Ics206Parser {
    context: Arc<ParserContext>,
}

impl Ics206Parser {
    pub fn new(context: Arc<ParserContext>) -> Self {
        Self { context }
    }
}

impl FormParser for Ics206Parser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics206
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Ics206)?;
        let iap_page = self.context.page(doc.value("iap_page"))?;

        let aid_stations = numbered_rows(MAX_AID_STATIONS, |i| {
            let station = MedicalAidStation {
                name: doc.value(&format!("aidname{i}")),
                location: doc.value(&format!("aidloc{i}")),
                contact: doc.value(&format!("aidcontact{i}")),
                paramedics_on_site: is_checked(&doc.value(&format!("aidparamedics{i}"))),
            };
            (!all_empty(&[&station.name, &station.location, &station.contact])).then_some(station)
        });
        let ambulances = numbered_rows(MAX_AMBULANCES, |i| {
            let service = AmbulanceService {
                name: doc.value(&format!("ambname{i}")),
                location: doc.value(&format!("ambloc{i}")),
                contact: doc.value(&format!("ambcontact{i}")),
                level_of_service: doc.value(&format!("amblevel{i}")),
            };
            (!all_empty(&[&service.name, &service.location, &service.contact])).then_some(service)
        });
        let hospitals = numbered_rows(MAX_HOSPITALS, |i| {
            let hospital = Hospital {
                name: doc.value(&format!("hospname{i}")),
                address: doc.value(&format!("hospaddr{i}")),
                contact: doc.value(&format!("hospcontact{i}")),
                travel_time_air: doc.value(&format!("hospair{i}")),
                travel_time_ground: doc.value(&format!("hospground{i}")),
                trauma_center: doc.value(&format!("hosptrauma{i}")),
                burn_center: is_checked(&doc.value(&format!("hospburn{i}"))),
                helipad: is_checked(&doc.value(&format!("hosphelipad{i}"))),
            };
            (!all_empty(&[&hospital.name, &hospital.address, &hospital.contact])).then_some(hospital)
        });

        Ok(TypedMessage::Ics206(Ics206Message {
            raw: raw.clone(),
            header: IcsHeader::read(&doc),
            aid_stations,
            ambulances,
            hospitals,
            emergency_procedures: doc.value("procedures"),
            approved_by: doc.value("approvedby"),
            iap_page,
        }))
    }
}
