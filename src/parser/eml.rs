//! Reader for single-message files (`.eml`, `.mime`) as written by Winlink
//! Express "save message" and by exercise collection scripts.

use std::path::Path;

use crate::error::{FormError, Result};
use crate::model::raw::RawMessage;

/// File extensions treated as single messages when scanning a directory.
pub const MESSAGE_EXTENSIONS: [&str; 3] = ["eml", "mime", "b2f"];

/// Read one message file into a [`RawMessage`].
///
/// When the headers carry no `Message-ID`, the file stem is used instead,
/// which matches how Winlink names its exported files.
pub fn read_eml(path: impl AsRef<Path>) -> Result<RawMessage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FormError::FileNotFound(path.to_path_buf())
        } else {
            FormError::io(path, e)
        }
    })?;

    let mut message = RawMessage::from_mime(&data)?;
    if message.message_id.is_empty() {
        if let Some(stem) = path.file_stem() {
            message.message_id = stem.to_string_lossy().into_owned();
        }
    }
    Ok(message)
}

/// Whether a path looks like a single-message file.
pub fn is_message_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MESSAGE_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)))
}
