//! Winlink Check In, Check Out and MIRO Check In.
//!
//! These forms arrive in two encodings: the viewer XML attachment, or the
//! raw `FormData.txt` key=value data (attached, or received separately and
//! looked up by sender and message id). Both go through the same
//! [`FieldSource`] extraction, so either encoding yields the same fields.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::{template_version, viewer_document, FormParser, ParserContext};
use crate::error::ExtractError;
use crate::model::location::LatLongPair;
use crate::model::message_type::{MessageTypeId, FORM_DATA_NAME};
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::model::typed::TypedMessage;
use crate::toolkit::formdata::FormData;
use crate::toolkit::latlong::resolve_lat_long;
use crate::toolkit::FieldSource;

/// Where the field values were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEncoding {
    ViewerXml,
    FormDataAttachment,
    FormDataStore,
}

/// Fields shared by every check-in style form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInForm {
    pub version: Option<String>,
    pub organization: String,
    pub date_time: String,
    pub contact_call: String,
    pub contact_name: String,
    pub initial_operators: String,
    /// `Exercise` or `Real Event`.
    pub status: String,
    /// Served agency or service (`ARES`, `RACES`, …).
    pub service: String,
    pub band: String,
    pub session: String,
    pub location_text: String,
    pub mgrs: String,
    pub grid: String,
    pub comments: String,
    pub location: LatLongPair,
    /// Station capability block, MIRO check-ins only.
    pub miro: Option<MiroDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiroDetails {
    pub radios: String,
    pub antennas: String,
    pub power_source: String,
    pub battery_hours: String,
    pub voice_bands: String,
    pub data_bands: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInMessage {
    pub raw: Arc<RawMessage>,
    pub encoding: FormEncoding,
    pub form: CheckInForm,
}

pub struct CheckInParser {
    message_type: MessageTypeId,
    context: Arc<ParserContext>,
}

impl CheckInParser {
    pub fn new(message_type: MessageTypeId, context: Arc<ParserContext>) -> Self {
        Self {
            message_type,
            context,
        }
    }

    fn read_form(&self, source: &impl FieldSource) -> Result<CheckInForm, ExtractError> {
        let location = resolve_lat_long(source, &[]).require()?;
        let miro = (self.message_type == MessageTypeId::MiroCheckIn).then(|| MiroDetails {
            radios: source.value("radios"),
            antennas: source.value("antennas"),
            power_source: source.value("power"),
            battery_hours: source.value("batteryhours"),
            voice_bands: source.value("voicebands"),
            data_bands: source.value("databands"),
        });

        Ok(CheckInForm {
            version: template_version(source),
            organization: source.value("organization"),
            date_time: source.first_of(&["datetime", "date_time"]),
            contact_call: source.first_of(&["contactcall", "msgsender"]),
            contact_name: source.value("contactname"),
            initial_operators: source.value("initialoperators"),
            status: source.value("status"),
            service: source.value("service"),
            band: source.value("band"),
            session: source.first_of(&["session", "mode"]),
            location_text: source.value("locationtext"),
            mgrs: source.value("mgrs"),
            grid: source.value("grid"),
            comments: source.value("comments"),
            location,
            miro,
        })
    }

    fn wrap(&self, message: CheckInMessage) -> TypedMessage {
        match self.message_type {
            MessageTypeId::CheckOut => TypedMessage::CheckOut(message),
            MessageTypeId::MiroCheckIn => TypedMessage::MiroCheckIn(message),
            _ => TypedMessage::CheckIn(message),
        }
    }

    fn finish(&self, raw: &Arc<RawMessage>, encoding: FormEncoding, form: CheckInForm) -> TypedMessage {
        if self.context.is_filtered(raw) {
            info!(message_id = %raw.message_id, from = %raw.from, ?encoding, "Extracted filtered check-in");
        } else {
            debug!(message_id = %raw.message_id, ?encoding, "Extracted check-in");
        }
        self.wrap(CheckInMessage {
            raw: raw.clone(),
            encoding,
            form,
        })
    }
}

impl FormParser for CheckInParser {
    fn message_type(&self) -> MessageTypeId {
        self.message_type
    }

    /// Viewer XML first, then the attached `FormData.txt`, then the store.
    /// The first encoding that yields a form wins; when none does, the
    /// earliest failure is reported.
    fn extract(&self, raw: &Arc<RawMessage>) -> Result<TypedMessage, ExtractError> {
        let mut first_error: Option<ExtractError> = None;

        if self.message_type.find_attachment(raw.attachment_names()).is_some() {
            match viewer_document(raw, self.message_type).and_then(|doc| self.read_form(&doc)) {
                Ok(form) => return Ok(self.finish(raw, FormEncoding::ViewerXml, form)),
                Err(e) => {
                    debug!(message_id = %raw.message_id, error = %e, "Viewer XML unusable, trying form data");
                    first_error = Some(e);
                }
            }
        }

        if let Some(text) = raw.form_data_text() {
            match self.read_form(&FormData::parse(&text)) {
                Ok(form) => return Ok(self.finish(raw, FormEncoding::FormDataAttachment, form)),
                Err(e) => first_error = first_error.or(Some(e)),
            }
        }

        if let Some(data) = self.context.form_data.get(&raw.from, &raw.message_id) {
            match self.read_form(data) {
                Ok(form) => return Ok(self.finish(raw, FormEncoding::FormDataStore, form)),
                Err(e) => first_error = first_error.or(Some(e)),
            }
        }

        Err(first_error.unwrap_or_else(|| {
            ExtractError::reject(
                RejectReason::CantFindFormData,
                format!(
                    "no viewer attachment, {FORM_DATA_NAME} or stored form data for sender {}, message {}",
                    raw.from, raw.message_id
                ),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::formdata::FormDataStore;

    const VIEWER: &str = r#"<?xml version="1.0"?>
<RMS_Express_Form>
  <variables>
    <templateversion>Winlink Check In 5.0.12</templateversion>
    <organization>ACS Exercise</organization>
    <datetime>2024-03-05 14:30:00</datetime>
    <contactcall>KM6SO</contactcall>
    <contactname>Sam</contactname>
    <status>Exercise</status>
    <band>VHF</band>
    <session>Packet</session>
    <maplat>37.77</maplat>
    <maplon>-122.42</maplon>
    <comments>All good</comments>
  </variables>
</RMS_Express_Form>"#;

    const FORM_DATA: &str = "MapFileName=Winlink Check In Initial.html\n\
templateversion=Winlink Check In 5.0.12\n\
organization=ACS Exercise\n\
datetime=2024-03-05 14:30:00\n\
contactcall=KM6SO\n\
contactname=Sam\n\
status=Exercise\n\
band=VHF\n\
session=Packet\n\
maplat=37.77\n\
maplon=-122.42\n\
comments=All good\n";

    fn parser(store: FormDataStore) -> CheckInParser {
        CheckInParser::new(
            MessageTypeId::CheckIn,
            Arc::new(ParserContext::new().with_form_data(store)),
        )
    }

    fn extract(parser: &CheckInParser, raw: RawMessage) -> CheckInMessage {
        match parser.parse(&Arc::new(raw)) {
            Ok(TypedMessage::CheckIn(m)) => m,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_viewer_xml() {
        let raw = RawMessage::new("MID1", "KM6SO", "Winlink Check In")
            .with_attachment("RMS_Express_Form_Winlink Check In_viewer.xml", VIEWER);
        let m = extract(&parser(FormDataStore::new()), raw);
        assert_eq!(m.encoding, FormEncoding::ViewerXml);
        assert_eq!(m.form.organization, "ACS Exercise");
        assert_eq!(m.form.version.as_deref(), Some("5.0.12"));
        assert_eq!(m.form.location, LatLongPair::new("37.77", "-122.42"));
        assert!(m.form.miro.is_none());
    }

    #[test]
    fn test_encodings_agree() {
        let xml = extract(
            &parser(FormDataStore::new()),
            RawMessage::new("MID1", "KM6SO", "s")
                .with_attachment("Winlink Check In_viewer.xml", VIEWER),
        );
        let attached = extract(
            &parser(FormDataStore::new()),
            RawMessage::new("MID1", "KM6SO", "s").with_attachment("FormData.txt", FORM_DATA),
        );
        let mut store = FormDataStore::new();
        store.insert("KM6SO", "MID1", FormData::parse(FORM_DATA));
        let stored = extract(&parser(store), RawMessage::new("MID1", "KM6SO", "s"));

        assert_eq!(attached.encoding, FormEncoding::FormDataAttachment);
        assert_eq!(stored.encoding, FormEncoding::FormDataStore);
        assert_eq!(xml.form, attached.form);
        assert_eq!(xml.form, stored.form);
    }

    #[test]
    fn test_no_form_data_anywhere() {
        let raw = Arc::new(RawMessage::new("MID1", "KM6SO", "Winlink Check In"));
        let rejection = parser(FormDataStore::new()).parse(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantFindFormData);
        assert!(rejection.context.contains("KM6SO"));
    }

    #[test]
    fn test_missing_location_lists_tags() {
        let raw = Arc::new(
            RawMessage::new("MID1", "KM6SO", "s")
                .with_attachment("FormData.txt", "MapFileName=Winlink Check In.html\norganization=x\n"),
        );
        let rejection = parser(FormDataStore::new()).parse(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseLatLong);
        for tag in ["map", "maplat", "maplon", "gps2", "gps2lat", "gps2lon", "gps", "gpslat", "gpslon", "location", "locationlat", "locationlon"] {
            assert!(rejection.context.contains(tag), "missing {tag}");
        }
    }

    #[test]
    fn test_tag_case_does_not_split_encodings() {
        let viewer = VIEWER.replace("maplat>", "MapLat>").replace("maplon>", "MapLon>");
        let xml = extract(
            &parser(FormDataStore::new()),
            RawMessage::new("MID1", "KM6SO", "s").with_attachment("Winlink Check In_viewer.xml", viewer),
        );
        let attached = extract(
            &parser(FormDataStore::new()),
            RawMessage::new("MID1", "KM6SO", "s")
                .with_attachment("FormData.txt", FORM_DATA.replace("maplat=", "MapLat=")),
        );
        assert_eq!(xml.encoding, FormEncoding::ViewerXml);
        assert_eq!(xml.form, attached.form);
    }

    #[test]
    fn test_broken_viewer_falls_back_to_form_data() {
        let raw = RawMessage::new("MID1", "KM6SO", "s")
            .with_attachment("Winlink Check In_viewer.xml", "<<< not xml")
            .with_attachment("FormData.txt", FORM_DATA);
        let m = extract(&parser(FormDataStore::new()), raw);
        assert_eq!(m.encoding, FormEncoding::FormDataAttachment);
        assert_eq!(m.form.location, LatLongPair::new("37.77", "-122.42"));
    }

    #[test]
    fn test_viewer_without_location_falls_back_to_form_data() {
        let viewer = "<form><organization>ACS Exercise</organization></form>";
        let raw = RawMessage::new("MID1", "KM6SO", "s")
            .with_attachment("Winlink Check In_viewer.xml", viewer)
            .with_attachment("FormData.txt", FORM_DATA);
        let m = extract(&parser(FormDataStore::new()), raw);
        assert_eq!(m.encoding, FormEncoding::FormDataAttachment);
        assert_eq!(m.form.organization, "ACS Exercise");
    }

    #[test]
    fn test_broken_viewer_falls_back_to_store() {
        let mut store = FormDataStore::new();
        store.insert("KM6SO", "MID1", FormData::parse(FORM_DATA));
        let raw = RawMessage::new("MID1", "KM6SO", "s").with_attachment("Winlink Check In_viewer.xml", "");
        let m = extract(&parser(store), raw);
        assert_eq!(m.encoding, FormEncoding::FormDataStore);
    }

    #[test]
    fn test_viewer_error_reported_when_nothing_else_works() {
        let raw = Arc::new(
            RawMessage::new("MID1", "KM6SO", "s")
                .with_attachment("Winlink Check In_viewer.xml", "<form><organization>x</organization></form>")
                .with_attachment("FormData.txt", "MapFileName=Winlink Check In.html\n"),
        );
        let rejection = parser(FormDataStore::new()).parse(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::CantParseLatLong);

        let raw = Arc::new(
            RawMessage::new("MID1", "KM6SO", "s").with_attachment("Winlink Check In_viewer.xml", "<<< not xml"),
        );
        let rejection = parser(FormDataStore::new()).parse(&raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::ProcessingError);
    }

    #[test]
    fn test_miro_details() {
        let parser = CheckInParser::new(MessageTypeId::MiroCheckIn, Arc::new(ParserContext::new()));
        let raw = Arc::new(RawMessage::new("MID1", "KM6SO", "s").with_attachment(
            "FormData.txt",
            "MapFileName=MIRO Check In.html\nradios=IC-7300\ngps2=34.1, -118.2\n",
        ));
        let Ok(TypedMessage::MiroCheckIn(m)) = parser.parse(&raw) else {
            panic!("expected MIRO check-in");
        };
        assert_eq!(m.form.miro.unwrap().radios, "IC-7300");
        assert_eq!(m.form.location, LatLongPair::new("34.1", "-118.2"));
    }
}
