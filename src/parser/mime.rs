//! MIME message decoding: known-malformation repair, body extraction, attachments.

use std::borrow::Cow;
use std::collections::BTreeMap;

use mail_parser::{MessageParser, MimeHeaders};
use tracing::debug;

use crate::error::{FormError, Result};
use crate::parser::header::decode_text_bytes;

/// Character references some client versions write that no XML or MIME
/// consumer accepts.
const INVALID_CHAR_REFS: [&str; 2] = ["&#0;", "&#x0;"];

/// A decoded message: repaired source, headers, text body and attachments.
#[derive(Debug, Clone, Default)]
pub struct DecodedMessage {
    /// The message text after repair, as handed to the MIME decoder.
    pub repaired: String,
    /// Everything before the first blank line.
    pub raw_headers: String,
    /// Plain-text body (from `text/plain`, or stripped from HTML).
    pub text: String,
    /// Attachment file name → decoded bytes.
    pub attachments: BTreeMap<String, Vec<u8>>,
}

/// Repair and decode a complete raw message.
///
/// Fails with [`FormError::MimeError`] when the text has no header block or
/// the decoder cannot make sense of it.
pub fn decode_message(raw_message: &[u8]) -> Result<DecodedMessage> {
    let text = decode_text_bytes(skip_from_line(raw_message));
    let repaired = repair_mime(&text).into_owned();

    let raw_headers = extract_raw_headers(&repaired);
    if !raw_headers.lines().any(|l| l.contains(':')) {
        return Err(FormError::MimeError("no header block".into()));
    }

    let msg = MessageParser::default()
        .parse(repaired.as_bytes())
        .ok_or_else(|| FormError::MimeError("unparseable MIME structure".into()))?;

    let body = msg
        .body_text(0)
        .map(|s| s.into_owned())
        .or_else(|| msg.body_html(0).map(|html| html_to_text(&html)))
        .unwrap_or_default();

    let mut attachments = BTreeMap::new();
    for (idx, part) in msg.attachments().enumerate() {
        let name = part
            .attachment_name()
            .map(String::from)
            .unwrap_or_else(|| format!("attachment_{idx}"));
        debug!(name = %name, size = part.contents().len(), "Decoded attachment");
        attachments.insert(name, part.contents().to_vec());
    }

    Ok(DecodedMessage {
        repaired,
        raw_headers,
        text: body,
        attachments,
    })
}

/// Rewrite the malformations Winlink clients are known to produce so the
/// MIME decoder accepts the message:
///
/// - doubled quotes around `filename`/`name` parameters inside a
///   `Content-Disposition` or `Content-Type` header block
///   (`filename=""Form.xml""`)
/// - the `&#0;` character reference
pub fn repair_mime(text: &str) -> Cow<'_, str> {
    let needs_quote_fix = text.contains("\"\"");
    let needs_ref_fix = INVALID_CHAR_REFS.iter().any(|r| text.contains(r));
    if !needs_quote_fix && !needs_ref_fix {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_disposition_block = false;
    for line in text.split_inclusive('\n') {
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("content-disposition:") || lower.starts_with("content-type:") {
            in_disposition_block = true;
        } else if !(line.starts_with(' ') || line.starts_with('\t')) {
            in_disposition_block = false;
        }

        if in_disposition_block && line.contains("\"\"") {
            out.push_str(&line.replace("\"\"", "\""));
        } else {
            out.push_str(line);
        }
    }

    for bad in INVALID_CHAR_REFS {
        if out.contains(bad) {
            out = out.replace(bad, "");
        }
    }
    Cow::Owned(out)
}

/// Skip an mbox `From ` separator line and a UTF-8 BOM.
fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Everything before the first blank line.
fn extract_raw_headers(text: &str) -> String {
    if let Some(pos) = text.find("\r\n\r\n") {
        if text.find("\n\n").is_none_or(|lf| lf > pos) {
            return text[..pos].to_string();
        }
    }
    match text.find("\n\n") {
        Some(pos) => text[..pos].to_string(),
        None => text.to_string(),
    }
}

/// Convert an HTML body to plain text: block tags become line breaks,
/// other tags are dropped and common entities decoded.
pub fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();
    for tag in ["<br>", "<br/>", "<br />", "<BR>", "</p>", "</P>", "</div>", "</tr>"] {
        text = text.replace(tag, "\n");
    }

    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTIPART: &str = "From: K1ABC@winlink.org\r\n\
Subject: ICS 213\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"XX\"\r\n\
\r\n\
--XX\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
See attached form\r\n\
--XX\r\n\
Content-Type: application/octet-stream; name=\"\"RMS_Express_Form_ICS213_Initial_Viewer.xml\"\"\r\n\
Content-Disposition: attachment;\r\n\
 filename=\"\"RMS_Express_Form_ICS213_Initial_Viewer.xml\"\"\r\n\
\r\n\
<RMS_Express_Form><subjectline>Test</subjectline></RMS_Express_Form>\r\n\
--XX--\r\n";

    #[test]
    fn test_repair_doubled_quotes_in_disposition_block() {
        let repaired = repair_mime(MULTIPART);
        assert!(repaired.contains("filename=\"RMS_Express_Form_ICS213_Initial_Viewer.xml\""));
        assert!(!repaired.contains("\"\"RMS"));
    }

    #[test]
    fn test_repair_leaves_body_quotes_alone() {
        let text = "Subject: x\n\nHe said \"\"hi\"\"\n";
        assert_eq!(repair_mime(text), text);
    }

    #[test]
    fn test_repair_invalid_char_ref() {
        let repaired = repair_mime("Subject: x\n\n<a>b&#0;c</a>\n");
        assert_eq!(repaired, "Subject: x\n\n<a>bc</a>\n");
    }

    #[test]
    fn test_repair_noop_is_borrowed() {
        assert!(matches!(repair_mime("Subject: ok\n\nbody"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_multipart_with_repair() {
        let decoded = decode_message(MULTIPART.as_bytes()).unwrap();
        assert!(decoded.text.contains("See attached form"));
        let xml = decoded
            .attachments
            .get("RMS_Express_Form_ICS213_Initial_Viewer.xml")
            .expect("attachment decoded under its repaired name");
        assert!(String::from_utf8_lossy(xml).contains("<subjectline>Test</subjectline>"));
    }

    #[test]
    fn test_decode_rejects_headerless_text() {
        assert!(matches!(
            decode_message(b"just some words\n\nand more"),
            Err(FormError::MimeError(_))
        ));
    }

    #[test]
    fn test_skip_from_line() {
        let data = b"From K1ABC Thu Jan 01 00:00:00 2024\nSubject: Test\n\nBody\n";
        assert!(skip_from_line(data).starts_with(b"Subject:"));
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(html_to_text("<p>Tom &amp; Jerry</p><br>next"), "Tom & Jerry\nnext");
    }
}
