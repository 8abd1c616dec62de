//! Rejections: messages that were classified but could not be extracted.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::message_type::MessageTypeId;
use super::raw::RawMessage;

/// Why a message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// The raw MIME body could not be decoded.
    CantParseMime,
    /// No valid latitude/longitude in any candidate field.
    #[serde(rename = "CANT_PARSE_LATLONG")]
    CantParseLatLong,
    /// The DYFI JSON block is missing or malformed.
    CantParseDyfiJson,
    /// The ETO JSON object is missing or malformed.
    CantParseEtoJson,
    /// Neither a `FormData.txt` attachment nor a side-channel entry exists.
    #[serde(rename = "CANT_FIND_FORMDATA")]
    CantFindFormData,
    /// The attachment is a template variant no parser supports.
    UnsupportedType,
    /// A date/time field did not match any accepted format (strict policy).
    CantParseDateTime,
    /// Anything else that went wrong inside a parser.
    ProcessingError,
    /// An operator replaced the location by hand.
    ExplicitLocation,
    /// An operator excluded the message, or a strict-policy field check failed.
    ExplicitOther,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CantParseMime => "CANT_PARSE_MIME",
            Self::CantParseLatLong => "CANT_PARSE_LATLONG",
            Self::CantParseDyfiJson => "CANT_PARSE_DYFI_JSON",
            Self::CantParseEtoJson => "CANT_PARSE_ETO_JSON",
            Self::CantFindFormData => "CANT_FIND_FORMDATA",
            Self::UnsupportedType => "UNSUPPORTED_TYPE",
            Self::CantParseDateTime => "CANT_PARSE_DATE_TIME",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::ExplicitLocation => "EXPLICIT_LOCATION",
            Self::ExplicitOther => "EXPLICIT_OTHER",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message that was classified but not extracted, with enough context to
/// explain why without parsing it again.
#[derive(Debug, Clone, Serialize)]
pub struct RejectionMessage {
    pub raw: Arc<RawMessage>,
    pub reason: RejectReason,
    pub context: String,
    /// The type the classifier assigned before extraction failed.
    pub attempted_type: MessageTypeId,
}

impl RejectionMessage {
    pub fn new(
        raw: Arc<RawMessage>,
        reason: RejectReason,
        context: impl Into<String>,
        attempted_type: MessageTypeId,
    ) -> Self {
        Self {
            raw,
            reason,
            context: context.into(),
            attempted_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_display_matches_serde() {
        for reason in [
            RejectReason::CantParseMime,
            RejectReason::CantParseLatLong,
            RejectReason::CantParseDyfiJson,
            RejectReason::CantParseEtoJson,
            RejectReason::CantFindFormData,
            RejectReason::UnsupportedType,
            RejectReason::CantParseDateTime,
            RejectReason::ProcessingError,
            RejectReason::ExplicitLocation,
            RejectReason::ExplicitOther,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
        }
    }
}
