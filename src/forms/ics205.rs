//! ICS-205 Incident Radio Communications Plan.

use std::sync::Arc;

use serde::Serialize;

use super::{all_empty, numbered_rows, template_version, viewer_document_without, FormParser, ParserContext};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::datetime::{DateTimeField, WINLINK_DATE_FORMATS};
use crate::toolkit::xml::PARSEME_BLOCK;
use crate::toolkit::FieldSource;

/// Channel rows on the form.
pub const MAX_CHANNELS: usize = 10;

/// Formats seen in "Date/Time Prepared", in the order they are tried.
pub const DATE_TIME_PREPARED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H%M",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M",
    "%d %b %Y %H%M",
];

#[derive(Debug, Clone, Serialize)]
pub struct RadioChannel {
    pub zone_group: String,
    pub channel_number: String,
    pub function: String,
    pub channel_name: String,
    pub assignment: String,
    pub rx_frequency: String,
    pub rx_narrow_wide: String,
    pub rx_tone: String,
    pub tx_frequency: String,
    pub tx_narrow_wide: String,
    pub tx_tone: String,
    pub mode: String,
    pub remarks: String,
}

impl RadioChannel {
    fn is_empty(&self) -> bool {
        all_empty(&[
            &self.zone_group,
            &self.channel_number,
            &self.function,
            &self.channel_name,
            &self.assignment,
            &self.rx_frequency,
            &self.tx_frequency,
            &self.mode,
            &self.remarks,
        ])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics205Message {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub incident_name: String,
    pub date_time_prepared: DateTimeField,
    pub date_from: String,
    pub date_to: String,
    pub time_from: String,
    pub time_to: String,
    pub channels: Vec<RadioChannel>,
    pub special_instructions: String,
    pub approved_by: String,
    pub approved_date_time: String,
    /// IAP page, numeric unless the lenient policy kept a raw value.
    pub iap_page: String,
}

pub struct Ics205Parser {
    context: Arc<ParserContext>,
}

impl Ics205Parser {
    pub fn new(context: Arc<ParserContext>) -> Self {
        Self { context }
    }
}

impl FormParser for Ics205Parser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics205
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document_without(raw, MessageTypeId::Ics205, PARSEME_BLOCK)?;

        let date_time_prepared = self.context.date_time(
            "Date/Time Prepared",
            DateTimeField::new(
                doc.value("datetimeprepared"),
                DATE_TIME_PREPARED_FORMATS,
                WINLINK_DATE_FORMATS,
            ),
        )?;
        let iap_page = self.context.page(doc.value("iap_page"))?;

        let channels = numbered_rows(MAX_CHANNELS, |i| {
            let channel = RadioChannel {
                zone_group: doc.value(&format!("zonegrp{i}")),
                channel_number: doc.value(&format!("chnum{i}")),
                function: doc.value(&format!("function{i}")),
                channel_name: doc.value(&format!("chname{i}")),
                assignment: doc.value(&format!("assign{i}")),
                rx_frequency: doc.value(&format!("rxfreq{i}")),
                rx_narrow_wide: doc.value(&format!("rxnw{i}")),
                rx_tone: doc.value(&format!("rxtone{i}")),
                tx_frequency: doc.value(&format!("txfreq{i}")),
                tx_narrow_wide: doc.value(&format!("txnw{i}")),
                tx_tone: doc.value(&format!("txtone{i}")),
                mode: doc.value(&format!("mode{i}")),
                remarks: doc.value(&format!("remarks{i}")),
            };
            (!channel.is_empty()).then_some(channel)
        });

        Ok(TypedMessage::Ics205(Ics205Message {
            raw: raw.clone(),
            version: template_version(&doc),
            organization: doc.value("organization"),
            incident_name: doc.value("incname"),
            date_time_prepared,
            date_from: doc.value("datefrom"),
            date_to: doc.value("dateto"),
            time_from: doc.value("timefrom"),
            time_to: doc.value("timeto"),
            channels,
            special_instructions: doc.value("specinstr"),
            approved_by: doc.value("approvedby"),
            approved_date_time: doc.value("approveddatetime"),
            iap_page,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reject::RejectReason;

    fn message(date: &str, page: &str) -> Arc<RawMessage> {
        let xml = format!(
            "<RMS_Express_Form><variables>\
<incname>Quake</incname><datetimeprepared>{date}</datetimeprepared><iap_page>{page}</iap_page>\
<chnum1>1</chnum1><function1>Command</function1><rxfreq1>146.520</rxfreq1>\
<chnum3>3</chnum3><chname3>TAC 3</chname3>\
<parseme><a>1 < 2 & broken</a></parseme>\
</variables></RMS_Express_Form>"
        );
        Arc::new(
            RawMessage::new("MID", "K1ABC", "ICS 205")
                .with_attachment("RMS_Express_Form_ICS205 Radio Plan_viewer.xml", xml),
        )
    }

    fn parser(strict: bool) -> Ics205Parser {
        Ics205Parser::new(Arc::new(ParserContext::new().with_strict_parsing(strict)))
    }

    #[test]
    fn test_channels_and_date() {
        let Ok(TypedMessage::Ics205(m)) = parser(true).parse(&message("2024-03-05 14:30", "2")) else {
            panic!("expected ICS-205");
        };
        assert_eq!(m.incident_name, "Quake");
        assert!(m.date_time_prepared.parsed.is_some());
        assert_eq!(m.channels.len(), 2);
        assert_eq!(m.channels[1].channel_name, "TAC 3");
        assert_eq!(m.iap_page, "2");
    }

    #[test]
    fn test_lenient_keeps_bad_date() {
        let Ok(TypedMessage::Ics205(m)) = parser(false).parse(&message("last tuesday", "two")) else {
            panic!("expected ICS-205");
        };
        assert_eq!(m.date_time_prepared.raw, "last tuesday");
        assert!(m.date_time_prepared.parsed.is_none());
        assert_eq!(m.iap_page, "two");
    }

    #[test]
    fn test_strict_rejects_bad_date() {
        let rejection = parser(true).parse(&message("last tuesday", "2")).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseDateTime);
        assert!(rejection.context.contains("last tuesday"));
    }

    #[test]
    fn test_strict_rejects_bad_page() {
        let rejection = parser(true).parse(&message("2024-03-05 14:30", "two")).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::ExplicitOther);
    }
}
