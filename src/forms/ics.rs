//! Header and sign-off blocks shared by the ICS and HICS planning forms.
//!
//! The templates agree on most tag names for these blocks, but older
//! generations used `inc_name` and `prepared_by` style names, so each field
//! lists its alternatives.

use serde::Serialize;

use super::template_version;
use crate::toolkit::FieldSource;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IcsHeader {
    pub version: Option<String>,
    pub organization: String,
    pub incident_name: String,
    pub operational_period_from: String,
    pub operational_period_to: String,
    pub prepared_by: String,
    pub prepared_position: String,
    pub prepared_date_time: String,
}

impl IcsHeader {
    pub fn read(source: &impl FieldSource) -> Self {
        Self {
            version: template_version(source),
            organization: source.value("organization"),
            incident_name: source.first_of(&["incname", "inc_name", "incident_name"]),
            operational_period_from: source.first_of(&["opfrom", "op_from", "datefrom"]),
            operational_period_to: source.first_of(&["opto", "op_to", "dateto"]),
            prepared_by: source.first_of(&["prepname", "prepared_by"]),
            prepared_position: source.first_of(&["preppos", "prepared_position"]),
            prepared_date_time: source.first_of(&["prepdatetime", "prepared_datetime"]),
        }
    }
}
