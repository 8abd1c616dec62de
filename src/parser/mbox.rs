//! Mbox splitting for Winlink Express message exports.
//!
//! A message starts at every line beginning with `From ` (a UTF-8 BOM in
//! front of the first one is ignored). Line endings are kept as written.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{FormError, Result};

const READ_BUFFER_SIZE: usize = 256 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// An mbox file on disk.
pub struct MboxReader {
    path: PathBuf,
    file_size: u64,
}

impl MboxReader {
    /// Open an mbox file. Does not check that the content is actually mbox.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = std::fs::metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FormError::FileNotFound(path.clone())
            } else {
                FormError::io(&path, e)
            }
        })?;
        Ok(Self {
            path,
            file_size: metadata.len(),
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Call `on_message(offset, raw_bytes)` for every message, in file order.
    pub fn for_each_message(&self, mut on_message: impl FnMut(u64, &[u8])) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| FormError::io(&self.path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut offset: u64 = 0;
        let mut start: u64 = 0;
        let mut message: Vec<u8> = Vec::new();
        let mut line: Vec<u8> = Vec::new();

        loop {
            line.clear();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(|e| FormError::io(&self.path, e))?;
            if read == 0 {
                break;
            }
            if starts_message(&line) {
                if !message.is_empty() {
                    on_message(start, &message);
                }
                message.clear();
                start = offset;
            }
            message.extend_from_slice(&line);
            offset += read as u64;
        }

        if !message.is_empty() {
            on_message(start, &message);
        }
        Ok(())
    }
}

fn starts_message(line: &[u8]) -> bool {
    line.strip_prefix(UTF8_BOM).unwrap_or(line).starts_with(b"From ")
}
