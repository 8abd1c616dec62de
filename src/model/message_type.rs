//! The closed set of message types the engine recognizes.
//!
//! Every type carries the attachment convention it is keyed on. Most forms
//! ship an "RMS viewer" XML attachment named
//! `RMS_Express_Form_<viewer name>`; a few families share a name prefix
//! because template authors appended version numbers to the file name.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Prefix Winlink Express puts in front of every viewer attachment name.
pub const VIEWER_PREFIX: &str = "RMS_Express_Form_";

/// Suffix every viewer attachment name ends with (case varies between templates).
pub const VIEWER_SUFFIX: &str = "_viewer.xml";

/// Name of the key=value side-channel attachment.
pub const FORM_DATA_NAME: &str = "FormData.txt";

/// How a type is recognized from an attachment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentRule {
    /// The viewer name must match exactly.
    Exact(&'static str),
    /// Any viewer attachment whose name starts with this prefix.
    Prefix(&'static str),
}

impl AttachmentRule {
    /// Check an attachment name, with or without the `RMS_Express_Form_` prefix.
    pub fn matches(&self, attachment_name: &str) -> bool {
        let name = strip_viewer_prefix(attachment_name);
        match self {
            Self::Exact(expected) => name == *expected,
            Self::Prefix(prefix) => name.starts_with(prefix) && has_viewer_suffix(name),
        }
    }
}

impl fmt::Display for AttachmentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Prefix(prefix) => write!(f, "{prefix}*{VIEWER_SUFFIX}"),
        }
    }
}

/// Remove the `RMS_Express_Form_` prefix if present.
pub fn strip_viewer_prefix(name: &str) -> &str {
    name.strip_prefix(VIEWER_PREFIX).unwrap_or(name)
}

fn has_viewer_suffix(name: &str) -> bool {
    name.len()
        .checked_sub(VIEWER_SUFFIX.len())
        .and_then(|start| name.get(start..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(VIEWER_SUFFIX))
}

/// Every message type, including the synthetic `Rejects` bucket and the
/// detail sub-types some forms emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageTypeId {
    /// Synthetic bucket for messages that could not be extracted.
    Rejects,
    /// Anything the classifier does not recognize.
    Plain,
    Ack,
    CheckIn,
    CheckOut,
    MiroCheckIn,
    FieldSituation,
    Ics213,
    Ics213Reply,
    Ics213Rr,
    Hics213,
    Ics205,
    Ics214,
    Hics214,
    Ics309,
    Ics201,
    Ics202,
    Ics203,
    Ics204,
    Ics205A,
    Ics206,
    Ics208,
    Ics209,
    Ics210,
    Ics211,
    Ics215A,
    Ics217A,
    Ics218,
    Ics221,
    Hics259,
    Hics251,
    Hics253,
    Hics254,
    Hics255,
    Hics257,
    Hics260,
    HospitalBed,
    HospitalBedDetail,
    WxLocal,
    WxSevere,
    WxHurricane,
    EyeWarn,
    EyeWarnDetail,
    DamageAssessment,
    Spotrep,
    HumanitarianNeeds,
    Radiogram,
    RriWelfareRadiogram,
    RriReplyWelfareRadiogram,
    RriQuickWelfare,
    WaIsnap,
    WelfareBulletinBoard,
    Bulletin,
    QuickMessage,
    ShelterStatus,
    SkywarnReport,
    Dyfi,
    EtoCheckIn,
    EtoResume,
    WaterLevel,
    Position,
}

impl MessageTypeId {
    pub const ALL: [MessageTypeId; 61] = [
        Self::Rejects,
        Self::Plain,
        Self::Ack,
        Self::CheckIn,
        Self::CheckOut,
        Self::MiroCheckIn,
        Self::FieldSituation,
        Self::Ics213,
        Self::Ics213Reply,
        Self::Ics213Rr,
        Self::Hics213,
        Self::Ics205,
        Self::Ics214,
        Self::Hics214,
        Self::Ics309,
        Self::Ics201,
        Self::Ics202,
        Self::Ics203,
        Self::Ics204,
        Self::Ics205A,
        Self::Ics206,
        Self::Ics208,
        Self::Ics209,
        Self::Ics210,
        Self::Ics211,
        Self::Ics215A,
        Self::Ics217A,
        Self::Ics218,
        Self::Ics221,
        Self::Hics259,
        Self::Hics251,
        Self::Hics253,
        Self::Hics254,
        Self::Hics255,
        Self::Hics257,
        Self::Hics260,
        Self::HospitalBed,
        Self::HospitalBedDetail,
        Self::WxLocal,
        Self::WxSevere,
        Self::WxHurricane,
        Self::EyeWarn,
        Self::EyeWarnDetail,
        Self::DamageAssessment,
        Self::Spotrep,
        Self::HumanitarianNeeds,
        Self::Radiogram,
        Self::RriWelfareRadiogram,
        Self::RriReplyWelfareRadiogram,
        Self::RriQuickWelfare,
        Self::WaIsnap,
        Self::WelfareBulletinBoard,
        Self::Bulletin,
        Self::QuickMessage,
        Self::ShelterStatus,
        Self::SkywarnReport,
        Self::Dyfi,
        Self::EtoCheckIn,
        Self::EtoResume,
        Self::WaterLevel,
        Self::Position,
    ];

    /// Stable lowercase key used in output, config and logs.
    pub fn key(self) -> &'static str {
        match self {
            Self::Rejects => "rejects",
            Self::Plain => "plain",
            Self::Ack => "ack",
            Self::CheckIn => "check_in",
            Self::CheckOut => "check_out",
            Self::MiroCheckIn => "miro_check_in",
            Self::FieldSituation => "field_situation",
            Self::Ics213 => "ics_213",
            Self::Ics213Reply => "ics_213_reply",
            Self::Ics213Rr => "ics_213_rr",
            Self::Ics205 => "ics_205",
            Self::Ics214 => "ics_214",
            Self::Ics309 => "ics_309",
            Self::Hics259 => "hics_259",
            Self::HospitalBed => "hospital_bed",
            Self::HospitalBedDetail => "hospital_bed_detail",
            Self::WxLocal => "wx_local",
            Self::WxSevere => "wx_severe",
            Self::WxHurricane => "wx_hurricane",
            Self::EyeWarn => "eyewarn",
            Self::EyeWarnDetail => "eyewarn_detail",
            Self::DamageAssessment => "damage_assessment",
            Self::Spotrep => "spotrep",
            Self::HumanitarianNeeds => "humanitarian_needs",
            Self::Radiogram => "radiogram",
            Self::RriWelfareRadiogram => "rri_welfare_radiogram",
            Self::RriQuickWelfare => "rri_quick_welfare",
            Self::WaIsnap => "wa_isnap",
            Self::WelfareBulletinBoard => "welfare_bulletin_board",
            Self::Dyfi => "dyfi",
            Self::EtoCheckIn => "eto_check_in",
            Self::EtoResume => "eto_resume",
            Self::WaterLevel => "water_level",
            Self::Position => "position",
            Self::Ics201 => "ics_201",
            Self::Ics202 => "ics_202",
            Self::Ics203 => "ics_203",
            Self::Ics204 => "ics_204",
            Self::Ics205A => "ics_205a",
            Self::Ics206 => "ics_206",
            Self::Ics208 => "ics_208",
            Self::Ics209 => "ics_209",
            Self::Ics210 => "ics_210",
            Self::Ics211 => "ics_211",
            Self::Ics215A => "ics_215a",
            Self::Ics217A => "ics_217a",
            Self::Ics218 => "ics_218",
            Self::Ics221 => "ics_221",
            Self::Hics213 => "hics_213",
            Self::Hics214 => "hics_214",
            Self::Hics251 => "hics_251",
            Self::Hics253 => "hics_253",
            Self::Hics254 => "hics_254",
            Self::Hics255 => "hics_255",
            Self::Hics257 => "hics_257",
            Self::Hics260 => "hics_260",
            Self::Bulletin => "bulletin",
            Self::QuickMessage => "quick_message",
            Self::ShelterStatus => "shelter_status",
            Self::SkywarnReport => "skywarn_report",
            Self::RriReplyWelfareRadiogram => "rri_reply_welfare_radiogram",
        }
    }

    /// The viewer attachment this type is keyed on, if any.
    pub fn attachment_rule(self) -> Option<AttachmentRule> {
        use AttachmentRule::{Exact, Prefix};
        let rule = match self {
            Self::CheckIn => Exact("Winlink Check In_viewer.xml"),
            Self::CheckOut => Exact("Winlink Check Out_viewer.xml"),
            Self::MiroCheckIn => Exact("MIRO Check In_viewer.xml"),
            Self::FieldSituation => Prefix("Field Situation Report"),
            Self::Ics213 => Exact("ICS213_Initial_Viewer.xml"),
            Self::Ics213Reply => Exact("ICS213_SendReply_Viewer.xml"),
            Self::Ics213Rr => Prefix("ICS213RR"),
            Self::Ics205 => Exact("ICS205 Radio Plan_viewer.xml"),
            Self::Ics214 => Exact("ICS214_Viewer.xml"),
            Self::Ics309 => Exact("ICS309_Viewer.xml"),
            Self::Hics259 => Exact("HICS 259_viewer.xml"),
            Self::HospitalBed => Exact("Hospital Bed Report_viewer.xml"),
            Self::WxLocal => Exact("Local Weather Report_viewer.xml"),
            Self::WxSevere => Exact("Severe WX Report_viewer.xml"),
            Self::EyeWarn => Exact("EyeWarn_viewer.xml"),
            Self::DamageAssessment => Exact("Damage Assessment_viewer.xml"),
            Self::Spotrep => Exact("SPOTREP_viewer.xml"),
            Self::HumanitarianNeeds => Exact("Humanitarian Needs_viewer.xml"),
            Self::Radiogram => Exact("Radiogram_viewer.xml"),
            Self::RriWelfareRadiogram => Exact("Welfare Radiogram_viewer.xml"),
            Self::WaIsnap => Exact("WA ISNAP_viewer.xml"),
            Self::WelfareBulletinBoard => Exact("Welfare Bulletin Board_viewer.xml"),
            Self::Ics201 => Exact("ICS201_Viewer.xml"),
            Self::Ics202 => Exact("ICS202_Viewer.xml"),
            Self::Ics203 => Exact("ICS203_Viewer.xml"),
            Self::Ics204 => Exact("ICS204_Viewer.xml"),
            Self::Ics205A => Exact("ICS205A_Viewer.xml"),
            Self::Ics206 => Exact("ICS206_Viewer.xml"),
            Self::Ics208 => Exact("ICS208_Viewer.xml"),
            Self::Ics209 => Exact("ICS209_Viewer.xml"),
            Self::Ics210 => Exact("ICS210_Viewer.xml"),
            Self::Ics211 => Exact("ICS211_Viewer.xml"),
            Self::Ics215A => Exact("ICS215A_Viewer.xml"),
            Self::Ics217A => Exact("ICS217A_Viewer.xml"),
            Self::Ics218 => Exact("ICS218_Viewer.xml"),
            Self::Ics221 => Exact("ICS221_Viewer.xml"),
            Self::Hics213 => Exact("HICS 213_viewer.xml"),
            Self::Hics214 => Exact("HICS 214_viewer.xml"),
            Self::Hics251 => Exact("HICS 251_viewer.xml"),
            Self::Hics253 => Exact("HICS 253_viewer.xml"),
            Self::Hics254 => Exact("HICS 254_viewer.xml"),
            Self::Hics255 => Exact("HICS 255_viewer.xml"),
            Self::Hics257 => Exact("HICS 257_viewer.xml"),
            Self::Hics260 => Exact("HICS 260_viewer.xml"),
            Self::Bulletin => Exact("Bulletin_viewer.xml"),
            Self::QuickMessage => Exact("Quick Message_viewer.xml"),
            Self::ShelterStatus => Exact("Shelter Status Report_viewer.xml"),
            Self::SkywarnReport => Exact("SKYWARN Report_viewer.xml"),
            Self::RriReplyWelfareRadiogram => Exact("Welfare Radiogram Reply_viewer.xml"),
            _ => return None,
        };
        Some(rule)
    }

    /// `MapFileName` prefix declared in `FormData.txt` for forms that can
    /// arrive without their viewer attachment.
    pub fn map_file_prefix(self) -> Option<&'static str> {
        match self {
            Self::CheckIn => Some("Winlink Check In"),
            Self::CheckOut => Some("Winlink Check Out"),
            Self::MiroCheckIn => Some("MIRO Check In"),
            _ => None,
        }
    }

    /// Types that never come out of the classifier.
    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Rejects) || self.is_detail()
    }

    /// Child-record types emitted next to a primary record.
    pub fn is_detail(self) -> bool {
        matches!(self, Self::HospitalBedDetail | Self::EyeWarnDetail)
    }

    /// Find the first attachment on a message that this type is keyed on.
    pub fn find_attachment<'a, I>(self, names: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let rule = self.attachment_rule()?;
        names.into_iter().find(|name| rule.matches(name))
    }
}

impl fmt::Display for MessageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when a string names no known message type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown message type: {0}")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageTypeId {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.key() == wanted)
            .ok_or_else(|| UnknownMessageType(s.to_string()))
    }
}

impl Serialize for MessageTypeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}
