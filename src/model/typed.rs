//! Typed records produced by the parsers, and the output element type.

use std::sync::Arc;

use serde::Serialize;

use super::message_type::MessageTypeId;
use super::raw::RawMessage;
use super::reject::RejectionMessage;
use crate::forms::ack::AckMessage;
use crate::forms::bulletin::{BulletinMessage, QuickMessage};
use crate::forms::check_in::CheckInMessage;
use crate::forms::damage::DamageAssessmentMessage;
use crate::forms::dyfi::DyfiMessage;
use crate::forms::eto::{EtoCheckInMessage, EtoResumeMessage};
use crate::forms::eyewarn::{EyeWarnDetail, EyeWarnMessage};
use crate::forms::field_situation::FieldSituationMessage;
use crate::forms::hics::{Hics251Message, Hics253Message, Hics254Message, Hics255Message, Hics257Message, Hics260Message};
use crate::forms::hics259::Hics259Message;
use crate::forms::hospital_bed::{HospitalBedDetail, HospitalBedMessage};
use crate::forms::humanitarian::HumanitarianNeedsMessage;
use crate::forms::ics205::Ics205Message;
use crate::forms::ics206::Ics206Message;
use crate::forms::ics209::Ics209Message;
use crate::forms::ics213::Ics213Message;
use crate::forms::ics213rr::Ics213RrMessage;
use crate::forms::ics214::Ics214Message;
use crate::forms::ics309::Ics309Message;
use crate::forms::ics_comms::{Ics205AMessage, Ics217AMessage};
use crate::forms::ics_plan::{Ics201Message, Ics202Message, Ics203Message, Ics204Message, Ics208Message};
use crate::forms::ics_resources::{Ics210Message, Ics211Message, Ics215AMessage, Ics218Message, Ics221Message};
use crate::forms::plain::PlainMessage;
use crate::forms::position::PositionMessage;
use crate::forms::radiogram::RadiogramMessage;
use crate::forms::shelter::ShelterStatusMessage;
use crate::forms::skywarn::SkywarnReportMessage;
use crate::forms::spotrep::SpotrepMessage;
use crate::forms::wa_isnap::WaIsnapMessage;
use crate::forms::water_level::WaterLevelMessage;
use crate::forms::weather::{WxHurricaneMessage, WxLocalMessage, WxSevereMessage};
use crate::forms::welfare::{QuickWelfareMessage, WelfareBulletinBoardMessage};

/// Declares [`TypedMessage`] with one variant per parseable type. Each
/// variant is named after its [`MessageTypeId`] and its record carries `raw`.
macro_rules! typed_messages {
    ($($variant:ident($record:ty)),+ $(,)?) => {
        /// A successfully extracted message.
        #[derive(Debug, Clone, Serialize)]
        #[serde(untagged)]
        pub enum TypedMessage {
            $($variant($record)),+
        }

        impl TypedMessage {
            pub fn message_type(&self) -> MessageTypeId {
                match self {
                    $(Self::$variant(_) => MessageTypeId::$variant),+
                }
            }

            /// The message this record was extracted from.
            pub fn raw(&self) -> &Arc<RawMessage> {
                match self {
                    $(Self::$variant(m) => &m.raw),+
                }
            }
        }
    };
}

typed_messages! {
    Plain(PlainMessage),
    Ack(AckMessage),
    CheckIn(CheckInMessage),
    CheckOut(CheckInMessage),
    MiroCheckIn(CheckInMessage),
    FieldSituation(FieldSituationMessage),
    Ics213(Ics213Message),
    Ics213Reply(Ics213Message),
    Ics213Rr(Ics213RrMessage),
    Hics213(Ics213Message),
    Ics205(Ics205Message),
    Ics214(Ics214Message),
    Hics214(Ics214Message),
    Ics309(Ics309Message),
    Ics201(Ics201Message),
    Ics202(Ics202Message),
    Ics203(Ics203Message),
    Ics204(Ics204Message),
    Ics205A(Ics205AMessage),
    Ics206(Ics206Message),
    Ics208(Ics208Message),
    Ics209(Ics209Message),
    Ics210(Ics210Message),
    Ics211(Ics211Message),
    Ics215A(Ics215AMessage),
    Ics217A(Ics217AMessage),
    Ics218(Ics218Message),
    Ics221(Ics221Message),
    Hics259(Hics259Message),
    Hics251(Hics251Message),
    Hics253(Hics253Message),
    Hics254(Hics254Message),
    Hics255(Hics255Message),
    Hics257(Hics257Message),
    Hics260(Hics260Message),
    HospitalBed(HospitalBedMessage),
    WxLocal(WxLocalMessage),
    WxSevere(WxSevereMessage),
    WxHurricane(WxHurricaneMessage),
    EyeWarn(EyeWarnMessage),
    DamageAssessment(DamageAssessmentMessage),
    Spotrep(SpotrepMessage),
    HumanitarianNeeds(HumanitarianNeedsMessage),
    Radiogram(RadiogramMessage),
    RriWelfareRadiogram(RadiogramMessage),
    RriReplyWelfareRadiogram(RadiogramMessage),
    RriQuickWelfare(QuickWelfareMessage),
    WaIsnap(WaIsnapMessage),
    WelfareBulletinBoard(WelfareBulletinBoardMessage),
    Bulletin(BulletinMessage),
    QuickMessage(QuickMessage),
    ShelterStatus(ShelterStatusMessage),
    SkywarnReport(SkywarnReportMessage),
    Dyfi(DyfiMessage),
    EtoCheckIn(EtoCheckInMessage),
    EtoResume(EtoResumeMessage),
    WaterLevel(WaterLevelMessage),
    Position(PositionMessage),
}

impl TypedMessage {
    /// Child records emitted next to this one.
    pub fn details(&self) -> Vec<DetailRecord> {
        match self {
            Self::HospitalBed(m) => m.beds.iter().cloned().map(DetailRecord::HospitalBed).collect(),
            Self::EyeWarn(m) => m.details.iter().cloned().map(DetailRecord::EyeWarn).collect(),
            _ => Vec::new(),
        }
    }
}

/// A child record derived from one typed message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetailRecord {
    EyeWarn(EyeWarnDetail),
    HospitalBed(HospitalBedDetail),
}

impl DetailRecord {
    pub fn message_type(&self) -> MessageTypeId {
        match self {
            Self::EyeWarn(_) => MessageTypeId::EyeWarnDetail,
            Self::HospitalBed(_) => MessageTypeId::HospitalBedDetail,
        }
    }

    pub fn raw(&self) -> &Arc<RawMessage> {
        match self {
            Self::EyeWarn(d) => &d.raw,
            Self::HospitalBed(d) => &d.raw,
        }
    }
}

/// One element of an output bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum ExportedMessage {
    Typed(TypedMessage),
    Rejected(RejectionMessage),
    Detail(DetailRecord),
}

impl ExportedMessage {
    pub fn raw(&self) -> &Arc<RawMessage> {
        match self {
            Self::Typed(t) => t.raw(),
            Self::Rejected(r) => &r.raw,
            Self::Detail(d) => d.raw(),
        }
    }

    pub fn as_typed(&self) -> Option<&TypedMessage> {
        match self {
            Self::Typed(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_rejection(&self) -> Option<&RejectionMessage> {
        match self {
            Self::Rejected(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_detail(&self) -> Option<&DetailRecord> {
        match self {
            Self::Detail(d) => Some(d),
            _ => None,
        }
    }
}
