//! ICS-309 Communications Log.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{all_empty, numbered_rows, template_version, viewer_document, FormParser, ParserContext};
use crate::error::ExtractError;
use crate::model::message_type::MessageTypeId;
use crate::model::raw::RawMessage;
use crate::model::typed::TypedMessage;
use crate::toolkit::version::FormVersion;
use crate::toolkit::FieldSource;

/// Log rows on the form.
pub const MAX_ROWS: usize = 30;

/// Template defect workaround: viewer templates before 7.1 wrote each row's
/// "from" value into the "to" tag and the other way around.
pub const FROM_TO_SWAP_FIXED_IN: [u32; 2] = [7, 1];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunicationsLogEntry {
    pub date_time: String,
    pub from: String,
    pub to: String,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ics309Message {
    pub raw: Arc<RawMessage>,
    pub version: Option<String>,
    pub organization: String,
    pub task_number: String,
    pub incident_name: String,
    pub operational_period: String,
    pub date_time_prepared: String,
    pub radio_operator: String,
    pub station_id: String,
    pub page: String,
    pub activities: Vec<CommunicationsLogEntry>,
}

pub struct Ics309Parser {
    context: Arc<ParserContext>,
}

impl Ics309Parser {
    pub fn new(context: Arc<ParserContext>) -> Self {
        Self { context }
    }
}

/// Whether a template version still has the swapped from/to columns.
fn has_swapped_columns(version: Option<&str>) -> bool {
    version
        .and_then(FormVersion::parse)
        .is_some_and(|v| v < FormVersion::new(&FROM_TO_SWAP_FIXED_IN))
}

impl FormParser for Ics309Parser {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId::Ics309
    }

    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let doc = viewer_document(raw, MessageTypeId::Ics309)?;
        let version = template_version(&doc);
        let page = self.context.page(doc.value("page"))?;
        let swap = has_swapped_columns(version.as_deref());
        if swap {
            debug!(message_id = %raw.message_id, version = ?version, "Swapping ICS-309 from/to columns");
        }

        let activities = numbered_rows(MAX_ROWS, |i| {
            let mut entry = CommunicationsLogEntry {
                date_time: doc.value(&format!("time{i}")),
                from: doc.value(&format!("from{i}")),
                to: doc.value(&format!("to{i}")),
                subject: doc.value(&format!("subject{i}")),
            };
            if all_empty(&[&entry.date_time, &entry.from, &entry.to, &entry.subject]) {
                return None;
            }
            if swap {
                std::mem::swap(&mut entry.from, &mut entry.to);
            }
            Some(entry)
        });

        Ok(TypedMessage::Ics309(Ics309Message {
            raw: raw.clone(),
            version,
            organization: doc.value("organization"),
            task_number: doc.value("task"),
            incident_name: doc.value("inc_name"),
            operational_period: doc.value("op_period"),
            date_time_prepared: doc.value("datetimeprepared"),
            radio_operator: doc.value("radio_op"),
            station_id: doc.value("station_id"),
            page,
            activities,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reject::RejectReason;

    fn message(version: &str, page: &str) -> Arc<RawMessage> {
        let xml = format!(
            "<RMS_Express_Form><variables>\
<templateversion>ICS 309 {version}</templateversion><page>{page}</page>\
<time1>0800</time1><from1>NET</from1><to1>K1ABC</to1><subject1>check in</subject1>\
</variables></RMS_Express_Form>"
        );
        Arc::new(RawMessage::new("MID", "K1ABC", "309").with_attachment("ICS309_Viewer.xml", xml))
    }

    fn parse(version: &str, page: &str, strict: bool) -> crate::forms::ParseOutcome {
        Ics309Parser::new(Arc::new(ParserContext::new().with_strict_parsing(strict)))
            .parse(&message(version, page))
    }

    #[test]
    fn test_current_template_not_swapped() {
        let Ok(TypedMessage::Ics309(m)) = parse("7.1.2", "1", false) else {
            panic!("expected ICS-309");
        };
        assert_eq!(m.activities[0].from, "NET");
        assert_eq!(m.activities[0].to, "K1ABC");
    }

    #[test]
    fn test_old_template_swapped() {
        let Ok(TypedMessage::Ics309(m)) = parse("7.0.5", "1", false) else {
            panic!("expected ICS-309");
        };
        assert_eq!(m.activities[0].from, "K1ABC");
        assert_eq!(m.activities[0].to, "NET");
    }

    #[test]
    fn test_swap_threshold() {
        assert!(has_swapped_columns(Some("6.9")));
        assert!(!has_swapped_columns(Some("7.1")));
        assert!(!has_swapped_columns(None));
        assert!(!has_swapped_columns(Some("unknown")));
    }

    #[test]
    fn test_strict_page() {
        assert_eq!(
            parse("7.1", "1 of 2", true).unwrap_err().reason,
            RejectReason::ExplicitOther
        );
        assert!(parse("7.1", "1 of 2", false).is_ok());
    }
}
