//! Centralized error types for rmsforms.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::reject::RejectReason;

/// All errors produced by the rmsforms library.
#[derive(Error, Debug)]
pub enum FormError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    /// A MIME body could not be decoded.
    #[error("MIME decoding error: {0}")]
    MimeError(String),

    /// A form document could not be built. Every field lookup on it would be meaningless.
    #[error("Malformed form document in message {message_id}: {source}")]
    Xml {
        message_id: String,
        source: roxmltree::Error,
    },

    /// Embedded JSON could not be deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The attachment a parser expects is not present.
    #[error("Attachment '{name}' not found in message {message_id}")]
    MissingAttachment { message_id: String, name: String },

    /// An attachment or body is not valid text.
    #[error("Content of '{name}' is not valid text")]
    InvalidText { name: String },
}

/// Convenience alias for `Result<T, FormError>`.
pub type Result<T> = std::result::Result<T, FormError>;

/// Helper to convert a bare `std::io::Error` together with a path.
impl FormError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `FormError`
/// when no path context is available (rare, prefer `FormError::io`).
impl From<std::io::Error> for FormError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}

/// Why a single form extraction stopped.
///
/// `Rejected` is a known, named failure that becomes a rejection with its own
/// reason. `Form` is anything else and becomes a processing error.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{reason}: {context}")]
    Rejected {
        reason: RejectReason,
        context: String,
    },

    #[error(transparent)]
    Form(#[from] FormError),
}

impl ExtractError {
    /// Shorthand for a named rejection.
    pub fn reject(reason: RejectReason, context: impl Into<String>) -> Self {
        Self::Rejected {
            reason,
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(source: serde_json::Error) -> Self {
        Self::Form(FormError::Json(source))
    }
}
