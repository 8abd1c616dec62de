//! Compile-time table from message type to parser.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::ack::AckParser;
use super::bulletin::{BulletinParser, QuickMessageParser};
use super::check_in::CheckInParser;
use super::damage::DamageAssessmentParser;
use super::dyfi::DyfiParser;
use super::eto::{EtoCheckInParser, EtoResumeParser};
use super::eyewarn::EyeWarnParser;
use super::field_situation::FieldSituationParser;
use super::hics::HicsParser;
use super::hics259::Hics259Parser;
use super::hospital_bed::HospitalBedParser;
use super::humanitarian::HumanitarianNeedsParser;
use super::ics205::Ics205Parser;
use super::ics206::Ics206Parser;
use super::ics209::Ics209Parser;
use super::ics213::Ics213Parser;
use super::ics213rr::Ics213RrParser;
use super::ics214::Ics214Parser;
use super::ics309::Ics309Parser;
use super::ics_comms::{Ics205AParser, Ics217AParser};
use super::ics_plan::IcsPlanParser;
use super::ics_resources::IcsResourceParser;
use super::plain::PlainParser;
use super::position::PositionParser;
use super::radiogram::RadiogramParser;
use super::shelter::ShelterStatusParser;
use super::skywarn::SkywarnReportParser;
use super::spotrep::SpotrepParser;
use super::wa_isnap::WaIsnapParser;
use super::water_level::WaterLevelParser;
use super::weather::{WxHurricaneParser, WxLocalParser, WxSevereParser};
use super::welfare::{QuickWelfareParser, WelfareBulletinBoardParser};
use super::{FormParser, ParserContext};
use crate::model::message_type::MessageTypeId;

/// Exactly one parser for every non-synthetic message type.
pub struct ParserRegistry {
    parsers: BTreeMap<MessageTypeId, Box<dyn FormParser>>,
}

impl ParserRegistry {
    pub fn new(context: Arc<ParserContext>) -> Self {
        let parsers = MessageTypeId::ALL
            .into_iter()
            .filter_map(|t| parser_for(t, &context).map(|p| (t, p)))
            .collect();
        Self { parsers }
    }

    pub fn get(&self, message_type: MessageTypeId) -> Option<&dyn FormParser> {
        self.parsers.get(&message_type).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = MessageTypeId> + '_ {
        self.parsers.keys().copied()
    }
}

fn parser_for(message_type: MessageTypeId, context: &Arc<ParserContext>) -> Option<Box<dyn FormParser>> {
    use MessageTypeId as T;
    let parser: Box<dyn FormParser> = match message_type {
        T::Rejects | T::HospitalBedDetail | T::EyeWarnDetail => return None,
        T::Plain => Box::new(PlainParser),
        T::Ack => Box::new(AckParser),
        T::CheckIn | T::CheckOut | T::MiroCheckIn => Box::new(CheckInParser::new(message_type, context.clone())),
        T::FieldSituation => Box::new(FieldSituationParser),
        T::Ics213 | T::Ics213Reply | T::Hics213 => Box::new(Ics213Parser::new(message_type)),
        T::Ics213Rr => Box::new(Ics213RrParser),
        T::Ics205 => Box::new(Ics205Parser::new(context.clone())),
        T::Ics214 | T::Hics214 => Box::new(Ics214Parser::new(message_type)),
        T::Ics309 => Box::new(Ics309Parser::new(context.clone())),
        T::Ics201 | T::Ics202 | T::Ics203 | T::Ics204 | T::Ics208 => Box::new(IcsPlanParser::new(message_type)),
        T::Ics205A => Box::new(Ics205AParser),
        T::Ics206 => Box::new(Ics206Parser::new(context.clone())),
        T::Ics209 => Box::new(Ics209Parser::new(context.clone())),
        T::Ics210 | T::Ics211 | T::Ics215A | T::Ics218 | T::Ics221 => Box::new(IcsResourceParser::new(message_type)),
        T::Ics217A => Box::new(Ics217AParser),
        T::Hics259 => Box::new(Hics259Parser),
        T::Hics251 | T::Hics253 | T::Hics254 | T::Hics255 | T::Hics257 | T::Hics260 => {
            Box::new(HicsParser::new(message_type))
        }
        T::HospitalBed => Box::new(HospitalBedParser),
        T::WxLocal => Box::new(WxLocalParser),
        T::WxSevere => Box::new(WxSevereParser),
        T::WxHurricane => Box::new(WxHurricaneParser),
        T::EyeWarn => Box::new(EyeWarnParser),
        T::DamageAssessment => Box::new(DamageAssessmentParser),
        T::Spotrep => Box::new(SpotrepParser),
        T::HumanitarianNeeds => Box::new(HumanitarianNeedsParser),
        T::Radiogram | T::RriWelfareRadiogram | T::RriReplyWelfareRadiogram => {
            Box::new(RadiogramParser::new(message_type))
        }
        T::RriQuickWelfare => Box::new(QuickWelfareParser),
        T::WaIsnap => Box::new(WaIsnapParser),
        T::WelfareBulletinBoard => Box::new(WelfareBulletinBoardParser),
        T::Bulletin => Box::new(BulletinParser),
        T::QuickMessage => Box::new(QuickMessageParser),
        T::ShelterStatus => Box::new(ShelterStatusParser),
        T::SkywarnReport => Box::new(SkywarnReportParser),
        T::Dyfi => Box::new(DyfiParser),
        T::EtoCheckIn => Box::new(EtoCheckInParser),
        T::EtoResume => Box::new(EtoResumeParser),
        T::WaterLevel => Box::new(WaterLevelParser),
        T::Position => Box::new(PositionParser),
    };
    Some(parser)
}
