//! The raw message as delivered by the read stage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::location::{LatLongPair, LocationSource};
use super::message_type::{MessageTypeId, FORM_DATA_NAME};
use crate::error::{FormError, Result};
use crate::parser::{header, mime};

/// One exported Winlink message.
///
/// Created once by the read stage and shared read-only (as
/// `Arc<RawMessage>`) by every record derived from it. Raw bytes are not
/// serialized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawMessage {
    /// Winlink message id (`"ABC123DEF456"`).
    pub message_id: String,
    /// Sender call sign.
    pub from: String,
    /// First recipient call sign.
    pub to: String,
    pub to_list: Vec<String>,
    pub cc_list: Vec<String>,
    pub subject: String,
    /// Undecoded MIME text of the whole message.
    #[serde(skip)]
    pub mime: String,
    /// Decoded plain-text body.
    pub plain_content: String,
    /// Attachment file name → decoded bytes.
    #[serde(skip)]
    pub attachments: BTreeMap<String, Vec<u8>>,
    /// Best-effort position of the sender.
    pub location: Option<LatLongPair>,
    pub location_source: LocationSource,
    pub date: DateTime<Utc>,
}

impl RawMessage {
    pub fn new(
        message_id: impl Into<String>,
        from: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            from: from.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        let to = to.into();
        self.to_list.push(to.clone());
        self.to = to;
        self
    }

    pub fn with_plain_content(mut self, text: impl Into<String>) -> Self {
        self.plain_content = text.into();
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn with_attachment(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.attachments.insert(name.into(), bytes.into());
        self
    }

    pub fn with_location(mut self, location: LatLongPair, source: LocationSource) -> Self {
        self.location = Some(location);
        self.location_source = source;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    /// Build a message from the bytes of a complete RFC 5322 message.
    ///
    /// Known client malformations are repaired before decoding. The
    /// `X-Location` header supplies the position when present.
    pub fn from_mime(raw: &[u8]) -> Result<Self> {
        let decoded = mime::decode_message(raw)?;
        let headers = header::parse_message_headers(decoded.raw_headers.as_bytes());

        let (location, location_source) = headers
            .x_location
            .as_deref()
            .and_then(parse_x_location)
            .map(|(pair, source)| (Some(pair), source))
            .unwrap_or((None, LocationSource::Unknown));

        let to_list: Vec<String> = headers.to.iter().map(|a| a.callsign()).collect();
        Ok(Self {
            message_id: headers.message_id,
            from: headers.from.callsign(),
            to: to_list.first().cloned().unwrap_or_default(),
            to_list,
            cc_list: headers.cc.iter().map(|a| a.callsign()).collect(),
            subject: headers.subject,
            mime: decoded.repaired,
            plain_content: decoded.text,
            attachments: decoded.attachments,
            location,
            location_source,
            date: headers.date,
        })
    }

    pub fn attachment(&self, name: &str) -> Option<&[u8]> {
        self.attachments.get(name).map(Vec::as_slice)
    }

    pub fn attachment_names(&self) -> impl Iterator<Item = &str> {
        self.attachments.keys().map(String::as_str)
    }

    /// Decode an attachment to text (UTF-8, falling back to Windows-1252).
    pub fn attachment_text(&self, name: &str) -> Result<String> {
        let bytes = self
            .attachment(name)
            .ok_or_else(|| FormError::MissingAttachment {
                message_id: self.message_id.clone(),
                name: name.to_string(),
            })?;
        Ok(header::decode_text_bytes(bytes))
    }

    /// The viewer attachment a type is keyed on, as `(name, text)`.
    pub fn viewer_text(&self, message_type: MessageTypeId) -> Option<(String, Result<String>)> {
        let name = message_type.find_attachment(self.attachment_names())?;
        Some((name.to_string(), self.attachment_text(name)))
    }

    /// Text of the `FormData.txt` side-channel attachment, if present.
    pub fn form_data_text(&self) -> Option<String> {
        self.attachments
            .keys()
            .find(|k| k.eq_ignore_ascii_case(FORM_DATA_NAME))
            .and_then(|k| self.attachment_text(k).ok())
    }

    /// The decoded body, decoding the raw MIME when the read stage left
    /// `plain_content` empty.
    pub fn body_text(&self) -> Result<String> {
        if !self.plain_content.trim().is_empty() || self.mime.trim().is_empty() {
            return Ok(self.plain_content.clone());
        }
        Ok(mime::decode_message(self.mime.as_bytes())?.text)
    }
}

/// `"47.603000N, 122.330000W (GPS)"` → pair + source.
fn parse_x_location(value: &str) -> Option<(LatLongPair, LocationSource)> {
    let (coords, tag) = match value.find('(') {
        Some(pos) => (&value[..pos], &value[pos..]),
        None => (value, ""),
    };
    let pair = LatLongPair::from_hemisphere(coords.trim())?;
    pair.is_valid().then(|| (pair, LocationSource::from_tag(tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "From: KM6SO@winlink.org\r\n\
To: ETO-01@winlink.org, K1ABC@winlink.org\r\n\
Cc: W1AW@winlink.org\r\n\
Subject: Winlink Check In\r\n\
Message-ID: <ABC123DEF456@winlink.org>\r\n\
Date: Thu, 04 Jan 2024 10:00:00 +0000\r\n\
X-Location: 47.603000N, 122.330000W (GPS)\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Hello from the field\r\n";

    #[test]
    fn test_from_mime_headers() {
        let raw = RawMessage::from_mime(SAMPLE.as_bytes()).unwrap();
        assert_eq!(raw.message_id, "ABC123DEF456");
        assert_eq!(raw.from, "KM6SO");
        assert_eq!(raw.to, "ETO-01");
        assert_eq!(raw.to_list, vec!["ETO-01", "K1ABC"]);
        assert_eq!(raw.cc_list, vec!["W1AW"]);
        assert_eq!(raw.subject, "Winlink Check In");
        assert!(raw.plain_content.contains("Hello from the field"));
        assert_eq!(raw.date.format("%Y-%m-%d").to_string(), "2024-01-04");
    }

    #[test]
    fn test_from_mime_location() {
        let raw = RawMessage::from_mime(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            raw.location,
            Some(LatLongPair::new("47.603000", "-122.330000"))
        );
        assert_eq!(raw.location_source, LocationSource::Gps);
    }

    #[test]
    fn test_missing_attachment_is_error() {
        let raw = RawMessage::new("MID", "K1ABC", "subject");
        assert!(matches!(
            raw.attachment_text("nope.xml"),
            Err(FormError::MissingAttachment { .. })
        ));
    }

    #[test]
    fn test_viewer_text_finds_prefixed_name() {
        let raw = RawMessage::new("MID", "K1ABC", "subject")
            .with_attachment("RMS_Express_Form_ICS309_Viewer.xml", "<a/>");
        let (name, text) = raw.viewer_text(MessageTypeId::Ics309).unwrap();
        assert_eq!(name, "RMS_Express_Form_ICS309_Viewer.xml");
        assert_eq!(text.unwrap(), "<a/>");
        assert!(raw.viewer_text(MessageTypeId::Ics205).is_none());
    }

    #[test]
    fn test_body_text_prefers_plain_content() {
        let raw = RawMessage::new("MID", "K1ABC", "s").with_plain_content("body");
        assert_eq!(raw.body_text().unwrap(), "body");
    }
}
