//! RFC 5322 header parsing for Winlink messages: folding, encoded-words, dates.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use mail_parser::MessageParser;
use tracing::warn;

use crate::model::address::EmailAddress;

/// The headers the engine needs from each message.
#[derive(Debug, Clone, Default)]
pub struct MessageHeaders {
    pub message_id: String,
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub subject: String,
    pub date: DateTime<Utc>,
    /// Raw `X-Location` value, e.g. `"47.603000N, 122.330000W (GPS)"`.
    pub x_location: Option<String>,
}

/// Extract [`MessageHeaders`] from raw header bytes.
pub fn parse_message_headers(raw_headers: &[u8]) -> MessageHeaders {
    let text = decode_text_bytes(raw_headers);
    let headers = unfold_headers(&text);

    let decoded = |name: &str| {
        get_header(&headers, name)
            .map(|v| decode_encoded_words(&v))
            .unwrap_or_default()
    };

    let date = get_header(&headers, "date")
        .and_then(|d| parse_date(&d))
        .unwrap_or(DateTime::UNIX_EPOCH);

    MessageHeaders {
        message_id: get_header(&headers, "message-id")
            .map(|s| normalize_message_id(&s))
            .unwrap_or_default(),
        from: EmailAddress::parse(&decoded("from")),
        to: EmailAddress::parse_list(&decoded("to")),
        cc: EmailAddress::parse_list(&decoded("cc")),
        subject: decoded("subject"),
        date,
        x_location: get_header(&headers, "x-location"),
    }
}

/// Decode bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
pub fn decode_text_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Unfold headers: join continuation lines (starting with space or tab) with the previous header.
///
/// Returns a list of `(lowercase_name, raw_value)` pairs.
fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
    }

    result
}

/// Get the first value for a header name (case-insensitive).
fn get_header(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
}

/// Decode RFC 2047 encoded-words in a header value.
///
/// The value is wrapped in a minimal message so `mail-parser` does the
/// charset work. Values without encoded-words are returned unchanged.
pub fn decode_encoded_words(input: &str) -> String {
    if !input.contains("=?") {
        return input.to_string();
    }
    let fake_msg = format!("Subject: {input}\n\n");
    MessageParser::default()
        .parse(fake_msg.as_bytes())
        .and_then(|msg| msg.subject().map(str::to_string))
        .unwrap_or_else(|| input.to_string())
}

/// `"<ABC123DEF456@winlink.org>"` → `"ABC123DEF456"`.
///
/// Only the Winlink domain is dropped; foreign ids keep their domain.
fn normalize_message_id(s: &str) -> String {
    let trimmed = s.trim().trim_start_matches('<').trim_end_matches('>').trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) if domain.eq_ignore_ascii_case("winlink.org") => local.to_string(),
        _ => trimmed.to_string(),
    }
}

/// Parse a message date header.
///
/// Supports RFC 2822, RFC 3339, and the `YYYY/MM/DD HH:MM` form some gateways write.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = [
        "%d %b %Y %H:%M:%S %z",
        "%Y/%m/%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in &formats {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    warn!(date = trimmed, "Could not parse date");
    None
}
