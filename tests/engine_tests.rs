//! End-to-end tests: classification, extraction and rejection behavior over
//! whole messages.

use std::path::Path;
use std::sync::Arc;

use rmsforms::classify::Classifier;
use rmsforms::driver::Driver;
use rmsforms::forms::{FormParser, ParserContext, ParserRegistry};
use rmsforms::model::location::LatLongPair;
use rmsforms::model::message_type::MessageTypeId;
use rmsforms::model::raw::RawMessage;
use rmsforms::model::reject::RejectReason;
use rmsforms::model::typed::TypedMessage;
use rmsforms::parser;
use rmsforms::toolkit::formdata::{FormData, FormDataStore};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn lenient() -> Arc<ParserContext> {
    Arc::new(ParserContext::default())
}

fn strict() -> Arc<ParserContext> {
    Arc::new(ParserContext::new().with_strict_parsing(true))
}

fn parse(context: Arc<ParserContext>, raw: RawMessage) -> Result<TypedMessage, rmsforms::model::reject::RejectionMessage> {
    let raw = Arc::new(raw);
    let message_type = Classifier::new(context.clone()).classify(&raw);
    ParserRegistry::new(context)
        .get(message_type)
        .expect("classified types have parsers")
        .parse(&raw)
}

const CHECK_IN_XML: &str = r#"<RMS_Express_Form><variables>
<templateversion>Winlink Check In 5.0.12</templateversion>
<organization>ACS Exercise</organization>
<contactcall>KM6SO</contactcall>
<status>Exercise</status>
<band>VHF</band>
<maplat>37.77</maplat>
<maplon>-122.42</maplon>
<comments>All good</comments>
</variables></RMS_Express_Form>"#;

const CHECK_IN_FORM_DATA: &str = "MapFileName=Winlink Check In Initial.html\n\
templateversion=Winlink Check In 5.0.12\n\
organization=ACS Exercise\n\
contactcall=KM6SO\n\
status=Exercise\n\
band=VHF\n\
maplat=37.77\n\
maplon=-122.42\n\
comments=All good\n";

// ─── Whole mbox through the driver ──────────────────────────────────

#[test]
fn test_fixture_mbox_end_to_end() {
    let messages: Vec<Arc<RawMessage>> = parser::load_messages(&fixture("exercise.mbox"), None)
        .unwrap()
        .into_iter()
        .map(Arc::new)
        .collect();
    assert_eq!(messages.len(), 4);

    let result = Driver::new(lenient()).with_workers(2).run(&messages);
    assert_eq!(result.get(MessageTypeId::CheckIn).len(), 1);
    assert_eq!(result.get(MessageTypeId::Dyfi).len(), 1);
    assert_eq!(result.get(MessageTypeId::Position).len(), 1);
    assert_eq!(result.get(MessageTypeId::Plain).len(), 1);
    assert_eq!(result.rejects().count(), 0);

    let Some(TypedMessage::CheckIn(check_in)) = result.get(MessageTypeId::CheckIn)[0].as_typed() else {
        panic!("expected a check-in record");
    };
    assert_eq!(check_in.raw.message_id, "Q1W2E3R4T5Y6");
    assert_eq!(check_in.form.organization, "ACS Exercise");
    assert_eq!(check_in.form.location, LatLongPair::new("37.77", "-122.42"));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("check_in").is_some());
    assert_eq!(json["plain"][0]["kind"], "typed");
}

// ─── Totality ───────────────────────────────────────────────────────

#[test]
fn test_every_message_yields_exactly_one_primary_outcome() {
    let inputs = vec![
        RawMessage::default(),
        RawMessage::new("X", "K1ABC", "ACK: nothing"),
        RawMessage::new("X", "K1ABC", "DYFI").with_plain_content("no markers"),
        RawMessage::new("X", "K1ABC", "ETO Check-In").with_plain_content("{ broken"),
        RawMessage::new("X", "K1ABC", "s").with_attachment("ICS213RR_WebEOC_viewer.xml", "<form/>"),
        RawMessage::new("X", "K1ABC", "s").with_attachment("HICS 259_viewer.xml", vec![0xFF, 0xFE, 0x00, 0x9C]),
        RawMessage::new("X", "K1ABC", "s").with_mime("not a mime message at all"),
    ];
    let messages: Vec<Arc<RawMessage>> = inputs.into_iter().map(Arc::new).collect();
    let result = Driver::new(lenient()).run(&messages);

    let primary: usize = result
        .iter()
        .filter(|(t, _)| !t.is_detail())
        .map(|(_, records)| records.len())
        .sum();
    assert_eq!(primary, messages.len());
}

// ─── Classifier precedence ──────────────────────────────────────────

#[test]
fn test_attachment_rule_wins_over_subject_rule() {
    let raw = RawMessage::new("X", "K1ABC", "POSITION REPORT")
        .with_attachment("Field Situation Report 23_viewer.xml", "<form/>")
        .with_plain_content("LATITUDE: 1\nLONGITUDE: 2\n");
    assert_eq!(Classifier::new(lenient()).classify(&raw), MessageTypeId::FieldSituation);
}

#[test]
fn test_prefix_family_members_share_a_type() {
    let classifier = Classifier::new(lenient());
    for name in [
        "Field Situation Report_viewer.xml",
        "Field Situation Report 23_viewer.xml",
        "Field Situation Report 26_viewer.xml",
    ] {
        let raw = RawMessage::new("X", "K1ABC", "FSR").with_attachment(name, "<form/>");
        assert_eq!(classifier.classify(&raw), MessageTypeId::FieldSituation, "{name}");
    }
}

// ─── Lat/long ───────────────────────────────────────────────────────

#[test]
fn test_lat_long_falls_back_to_combined_gps2() {
    let xml = "<form><organization>ACS</organization><gps2>34.1, -118.2</gps2></form>";
    let raw = RawMessage::new("X", "K1ABC", "Check in").with_attachment("Winlink Check In_viewer.xml", xml);
    let Ok(TypedMessage::CheckIn(m)) = parse(lenient(), raw) else {
        panic!("expected check-in");
    };
    assert_eq!(m.form.location, LatLongPair::new("34.1", "-118.2"));
}

#[test]
fn test_missing_location_context_lists_every_tag() {
    let raw = RawMessage::new("X", "K1ABC", "Check in")
        .with_attachment("Winlink Check In_viewer.xml", "<form><organization>ACS</organization></form>");
    let rejection = parse(lenient(), raw).unwrap_err();
    assert_eq!(rejection.reason, RejectReason::CantParseLatLong);
    assert_eq!(rejection.attempted_type, MessageTypeId::CheckIn);
    assert_eq!(
        rejection.context,
        "couldn't find lat/long within tags: map, maplat, maplon, gps2, gps2lat, gps2lon, \
gps, gpslat, gpslon, location, locationlat, locationlon"
    );
}

// ─── Strict vs lenient ──────────────────────────────────────────────

fn ics205(date: &str) -> RawMessage {
    let xml = format!("<form><incname>Drill</incname><datetimeprepared>{date}</datetimeprepared></form>");
    RawMessage::new("X", "K1ABC", "205").with_attachment("ICS205 Radio Plan_viewer.xml", xml)
}

#[test]
fn test_bad_ics205_date_kept_when_lenient() {
    let Ok(TypedMessage::Ics205(m)) = parse(lenient(), ics205("sometime Tuesday")) else {
        panic!("expected ICS-205");
    };
    assert_eq!(m.date_time_prepared.raw, "sometime Tuesday");
    assert!(m.date_time_prepared.parsed.is_none());
}

#[test]
fn test_bad_ics205_date_rejected_when_strict() {
    let rejection = parse(strict(), ics205("sometime Tuesday")).unwrap_err();
    assert_eq!(rejection.reason, RejectReason::CantParseDateTime);
    assert!(rejection.context.contains("sometime Tuesday"));
}

#[test]
fn test_good_ics205_date_accepted_when_strict() {
    let Ok(TypedMessage::Ics205(m)) = parse(strict(), ics205("2024-03-05 14:30")) else {
        panic!("expected ICS-205");
    };
    assert!(m.date_time_prepared.parsed.is_some());
}

// ─── Dual encoding ──────────────────────────────────────────────────

#[test]
fn test_check_in_encodings_produce_the_same_form() {
    let via_xml = RawMessage::new("MID1", "KM6SO", "Check in").with_attachment("Winlink Check In_viewer.xml", CHECK_IN_XML);
    let via_attachment = RawMessage::new("MID1", "KM6SO", "Check in").with_attachment("FormData.txt", CHECK_IN_FORM_DATA);

    let mut store = FormDataStore::new();
    store.insert("KM6SO", "MID1", FormData::parse(CHECK_IN_FORM_DATA));
    let via_store_context = Arc::new(ParserContext::new().with_form_data(store));
    let via_store = RawMessage::new("MID1", "KM6SO", "Check in");

    let form = |outcome: Result<TypedMessage, _>| match outcome {
        Ok(TypedMessage::CheckIn(m)) => m.form,
        other => panic!("expected check-in, got {other:?}"),
    };
    let xml = form(parse(lenient(), via_xml));
    assert_eq!(xml, form(parse(lenient(), via_attachment)));
    assert_eq!(xml, form(parse(via_store_context, via_store)));
}

#[test]
fn test_truncated_check_in_viewer_uses_form_data() {
    let raw = RawMessage::new("MID1", "KM6SO", "Check in")
        .with_attachment("RMS_Express_Form_Winlink Check In_viewer.xml", "<<<< truncated")
        .with_attachment("FormData.txt", CHECK_IN_FORM_DATA);
    let Ok(TypedMessage::CheckIn(m)) = parse(lenient(), raw) else {
        panic!("expected check-in from form data");
    };
    assert_eq!(m.encoding, rmsforms::forms::check_in::FormEncoding::FormDataAttachment);
    assert_eq!(m.form.location, LatLongPair::new("37.77", "-122.42"));
}

// ─── JSON blocks ────────────────────────────────────────────────────

#[test]
fn test_dyfi_missing_end_marker_context() {
    let raw = RawMessage::new("X", "K1ABC", "DYFI report")
        .with_plain_content("--- BEGIN json ---\n{\"eventid\": \"x\"}\n");
    let rejection = parse(lenient(), raw).unwrap_err();
    assert_eq!(rejection.reason, RejectReason::CantParseDyfiJson);
    assert_eq!(rejection.context, "--- END json ---");
}

#[test]
fn test_eto_resume_from_body() {
    let raw = RawMessage::new("X", "K1ABC", "ETO Resume K1ABC")
        .with_plain_content("Resume:\n{\"call\": \"K1ABC\", \"experience\": \"10 years\"}\n");
    let Ok(TypedMessage::EtoResume(m)) = parse(lenient(), raw) else {
        panic!("expected ETO resume");
    };
    assert_eq!(m.payload.experience, "10 years");
}

// ─── No-throw ───────────────────────────────────────────────────────

#[test]
fn test_empty_and_garbage_attachments_are_processing_errors() {
    for (name, bytes) in [
        ("ICS309_Viewer.xml", Vec::new()),
        ("ICS214_Viewer.xml", vec![0x00, 0xFF, 0x13, 0x37, 0x80]),
        ("SPOTREP_viewer.xml", b"<<<<".to_vec()),
    ] {
        let raw = RawMessage::new("X", "K1ABC", "s").with_attachment(name, bytes);
        let rejection = parse(lenient(), raw).unwrap_err();
        assert_eq!(rejection.reason, RejectReason::ProcessingError, "{name}");
        assert!(!rejection.context.is_empty());
    }
}

// ─── On-disk inputs ─────────────────────────────────────────────────

#[test]
fn test_directory_of_message_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("AAAA1111BBBB.eml"),
        "From: K1ABC@winlink.org\nSubject: QUICK WELFARE\n\nName: Jo\n[X] I am safe and well.\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let messages: Vec<Arc<RawMessage>> = parser::load_messages(dir.path(), None)
        .unwrap()
        .into_iter()
        .map(Arc::new)
        .collect();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_id, "AAAA1111BBBB");

    let result = Driver::new(lenient()).run(&messages);
    assert_eq!(result.get(MessageTypeId::RriQuickWelfare).len(), 1);
}
