//! Input decoding: mbox streaming, single-message files, header decoding and
//! MIME handling. This is the thin read stage the CLI uses to feed the engine.

pub mod eml;
pub mod header;
pub mod mbox;
pub mod mime;

use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::model::raw::RawMessage;

/// Load every message under `path`: an mbox file, a single message file, or
/// a directory of message files (not recursive).
///
/// Messages whose MIME cannot be decoded are still returned, with only the
/// raw text filled in, so the engine can reject them explicitly.
pub fn load_messages(path: &Path, progress: Option<&dyn Fn(u64, u64)>) -> Result<Vec<RawMessage>> {
    if path.is_dir() {
        let mut files: Vec<_> = std::fs::read_dir(path)
            .map_err(|e| crate::error::FormError::io(path, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| eml::is_message_file(p))
            .collect();
        files.sort();

        let total = files.len() as u64;
        let mut messages = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            match eml::read_eml(file) {
                Ok(m) => messages.push(m),
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "Message not decodable");
                    let raw = std::fs::read(file).map_err(|e| crate::error::FormError::io(file, e))?;
                    let id = file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    messages.push(undecodable(id, &raw));
                }
            }
            if let Some(cb) = progress {
                cb(i as u64 + 1, total);
            }
        }
        return Ok(messages);
    }

    if eml::is_message_file(path) {
        return Ok(vec![eml::read_eml(path)?]);
    }

    let reader = mbox::MboxReader::new(path)?;
    let total = reader.file_size();
    let mut messages = Vec::new();
    reader.for_each_message(|offset, bytes| {
        match RawMessage::from_mime(bytes) {
            Ok(m) => messages.push(m),
            Err(e) => {
                warn!(offset, error = %e, "Message not decodable");
                messages.push(undecodable(format!("offset-{offset}"), bytes));
            }
        }
        if let Some(cb) = progress {
            cb(offset + bytes.len() as u64, total);
        }
    })?;
    debug!(path = %path.display(), count = messages.len(), "Loaded mbox");
    Ok(messages)
}

/// A message the read stage could not decode: only the raw text is kept.
fn undecodable(message_id: String, bytes: &[u8]) -> RawMessage {
    RawMessage::new(message_id, "", "").with_mime(header::decode_text_bytes(bytes))
}
