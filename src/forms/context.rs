//! Read-only state shared by the classifier and every parser.

use std::collections::HashSet;

use crate::error::ExtractError;
use crate::model::raw::RawMessage;
use crate::model::reject::RejectReason;
use crate::toolkit::datetime::DateTimeField;
use crate::toolkit::formdata::FormDataStore;

/// Built once before any message is processed, then shared as
/// `Arc<ParserContext>`.
#[derive(Debug, Clone, Default)]
pub struct ParserContext {
    /// Reject malformed secondary fields (dates, page numbers) instead of
    /// keeping the raw text.
    pub strict_parsing: bool,
    /// Message ids or sender calls whose handling is logged at `info`.
    pub filter_ids: HashSet<String>,
    /// Form data received apart from its message.
    pub form_data: FormDataStore,
}

impl ParserContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_parsing(mut self, strict: bool) -> Self {
        self.strict_parsing = strict;
        self
    }

    pub fn with_filter_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_ids = ids
            .into_iter()
            .map(|s| {
                let s: String = s.into();
                s.trim().to_ascii_uppercase()
            })
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn with_form_data(mut self, store: FormDataStore) -> Self {
        self.form_data = store;
        self
    }

    /// Whether the message's id or sender is of special interest.
    pub fn is_filtered(&self, raw: &RawMessage) -> bool {
        !self.filter_ids.is_empty()
            && (self.filter_ids.contains(&raw.message_id.to_ascii_uppercase())
                || self.filter_ids.contains(&raw.from.to_ascii_uppercase()))
    }

    /// Apply the date policy to a field.
    ///
    /// Empty values are accepted either way. A value no format accepts is
    /// kept raw when lenient and rejected with `CANT_PARSE_DATE_TIME` when
    /// strict.
    pub fn date_time(&self, label: &str, field: DateTimeField) -> Result<DateTimeField, ExtractError> {
        if self.strict_parsing && field.is_malformed() {
            return Err(ExtractError::reject(
                RejectReason::CantParseDateTime,
                format!("can't parse {label}: '{}'", field.raw),
            ));
        }
        Ok(field)
    }

    /// Apply the page policy: when strict, a non-empty page must be a number.
    pub fn page(&self, raw: String) -> Result<String, ExtractError> {
        let trimmed = raw.trim();
        if self.strict_parsing && !trimmed.is_empty() && trimmed.parse::<u32>().is_err() {
            return Err(ExtractError::reject(
                RejectReason::ExplicitOther,
                format!("non-numeric page: '{trimmed}'"),
            ));
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_id_or_sender() {
        let ctx = ParserContext::new().with_filter_ids(["abc123def456", " k1abc ", ""]);
        assert_eq!(ctx.filter_ids.len(), 2);
        assert!(ctx.is_filtered(&RawMessage::new("ABC123DEF456", "W1AW", "")));
        assert!(ctx.is_filtered(&RawMessage::new("OTHER", "K1ABC", "")));
        assert!(!ctx.is_filtered(&RawMessage::new("OTHER", "W1AW", "")));
    }

    #[test]
    fn test_lenient_date_keeps_raw() {
        let ctx = ParserContext::new();
        let field = ctx.date_time("date", DateTimeField::winlink("sometime")).unwrap();
        assert_eq!(field.raw, "sometime");
        assert!(field.parsed.is_none());
    }

    #[test]
    fn test_strict_date_rejects() {
        let ctx = ParserContext::new().with_strict_parsing(true);
        let err = ctx.date_time("date", DateTimeField::winlink("sometime")).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Rejected { reason: RejectReason::CantParseDateTime, .. }
        ));
        assert!(ctx.date_time("date", DateTimeField::winlink("")).is_ok());
    }

    #[test]
    fn test_strict_page() {
        let strict = ParserContext::new().with_strict_parsing(true);
        assert!(strict.page("2".into()).is_ok());
        assert!(strict.page("".into()).is_ok());
        assert!(matches!(
            strict.page("two".into()),
            Err(ExtractError::Rejected { reason: RejectReason::ExplicitOther, .. })
        ));
        assert_eq!(ParserContext::new().page("two".into()).unwrap(), "two");
    }
}
