//! ebMS error catalog and error reporting types
//!
//! Protocol-level faults are never thrown: the engine appends catalog-derived
//! entries to an [`ErrorList`] and reports failure. The catalog carries the
//! ebMS error codes this gateway emits, with locale-sensitive short texts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Locale used when rendering error short descriptions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    #[default]
    En,
    /// German
    De,
}

impl Locale {
    /// BCP 47 language tag
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }

    /// Parse a language tag, ignoring any region subtag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.split(['-', '_']).next().unwrap_or(tag) {
            "en" => Some(Self::En),
            "de" => Some(Self::De),
            _ => None,
        }
    }
}

/// Severity of an ebMS error entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only, processing continues
    Warning,
    /// Message handling failed
    Failure,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// ebMS error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Header or payload content disagrees with the schema or the P-Mode
    Content,
    /// Transport-level exchange problems
    Communication,
    /// MIME/attachment packaging problems
    Unpackaging,
    /// Faults while applying the processing mode
    Processing,
}

/// The ebMS error codes emitted by the inbound pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EbmsErrorCode {
    /// EBMS:0003 - a referenced value (MPC, signal target) is unknown
    ValueNotRecognized,
    /// EBMS:0004 - header values contradict each other or the P-Mode
    ValueInconsistent,
    /// EBMS:0006 - a receipt signal is not usable
    InvalidReceipt,
    /// EBMS:0009 - the Messaging header does not conform to the schema
    InvalidHeader,
    /// EBMS:0010 - no usable P-Mode or P-Mode leg
    ProcessingModeMismatch,
    /// EBMS:0011 - attachments disagree with the declared payload parts
    ExternalPayloadError,
}

impl EbmsErrorCode {
    /// Wire-level error code
    pub fn code(self) -> &'static str {
        match self {
            Self::ValueNotRecognized => "EBMS:0003",
            Self::ValueInconsistent => "EBMS:0004",
            Self::InvalidReceipt => "EBMS:0006",
            Self::InvalidHeader => "EBMS:0009",
            Self::ProcessingModeMismatch => "EBMS:0010",
            Self::ExternalPayloadError => "EBMS:0011",
        }
    }

    /// Severity assigned by the catalog
    pub fn severity(self) -> Severity {
        Severity::Failure
    }

    /// Category assigned by the catalog
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::ValueNotRecognized
            | Self::ValueInconsistent
            | Self::InvalidHeader
            | Self::InvalidReceipt => ErrorCategory::Content,
            Self::ProcessingModeMismatch => ErrorCategory::Processing,
            Self::ExternalPayloadError => ErrorCategory::Unpackaging,
        }
    }

    /// Locale-sensitive short description
    pub fn short_description(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::ValueNotRecognized, Locale::En) => {
                "A value in the message could not be associated with any known configuration"
            }
            (Self::ValueNotRecognized, Locale::De) => {
                "Ein Wert der Nachricht konnte keiner bekannten Konfiguration zugeordnet werden"
            }
            (Self::ValueInconsistent, Locale::En) => {
                "A value in the message is inconsistent with the rest of the message or the P-Mode"
            }
            (Self::ValueInconsistent, Locale::De) => {
                "Ein Wert der Nachricht ist inkonsistent zur restlichen Nachricht oder zur P-Mode"
            }
            (Self::InvalidReceipt, Locale::En) => {
                "The receipt signal does not reference the message it acknowledges"
            }
            (Self::InvalidReceipt, Locale::De) => {
                "Das Empfangsbestaetigungs-Signal referenziert keine bestaetigte Nachricht"
            }
            (Self::InvalidHeader, Locale::En) => {
                "The ebMS header is not valid against the ebMS schema"
            }
            (Self::InvalidHeader, Locale::De) => {
                "Der ebMS-Header ist nicht gueltig gegen das ebMS-Schema"
            }
            (Self::ProcessingModeMismatch, Locale::En) => {
                "No processing mode matches the message addressing information"
            }
            (Self::ProcessingModeMismatch, Locale::De) => {
                "Keine P-Mode passt zu den Adressierungsdaten der Nachricht"
            }
            (Self::ExternalPayloadError, Locale::En) => {
                "The MIME attachments do not correspond to the declared payload parts"
            }
            (Self::ExternalPayloadError, Locale::De) => {
                "Die MIME-Anhaenge entsprechen nicht den deklarierten Nutzdatenteilen"
            }
        }
    }

    /// Build a reportable entry from this catalog code
    pub fn as_error(self, locale: Locale) -> EbmsError {
        EbmsError {
            code: self,
            severity: self.severity(),
            category: self.category(),
            description: self.short_description(locale).to_string(),
            detail: None,
            ref_to_message_in_error: None,
        }
    }

    /// Build a reportable entry carrying an additional detail text
    pub fn as_error_with_detail(self, locale: Locale, detail: impl Into<String>) -> EbmsError {
        let mut error = self.as_error(locale);
        error.detail = Some(detail.into());
        error
    }
}

impl std::fmt::Display for EbmsErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single reportable ebMS error entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbmsError {
    /// Catalog code
    pub code: EbmsErrorCode,
    /// Severity of the entry
    pub severity: Severity,
    /// Catalog category
    pub category: ErrorCategory,
    /// Locale-rendered short description
    pub description: String,
    /// Optional free-form detail
    pub detail: Option<String>,
    /// Optional id of the message this error refers to
    pub ref_to_message_in_error: Option<String>,
}

/// Accumulator for ebMS error entries produced while handling one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    entries: Vec<EbmsError>,
}

impl ErrorList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, error: EbmsError) {
        self.entries.push(error);
    }

    /// Whether no entries have been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the recorded entries
    pub fn iter(&self) -> impl Iterator<Item = &EbmsError> {
        self.entries.iter()
    }

    /// Codes of the recorded entries, in insertion order
    pub fn codes(&self) -> Vec<EbmsErrorCode> {
        self.entries.iter().map(|e| e.code).collect()
    }

    /// Consume the list into its entries
    pub fn into_entries(self) -> Vec<EbmsError> {
        self.entries
    }
}

/// Structural protocol faults; distinct from reportable ebMS errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The element handed to a reader is not the expected one
    #[error("Unexpected element: expected {expected}, got {actual}")]
    UnexpectedElement {
        /// Name the caller expected
        expected: String,
        /// Name actually found
        actual: String,
    },

    /// A value failed validation outside message handling
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_codes() {
        assert_eq!(EbmsErrorCode::ValueNotRecognized.code(), "EBMS:0003");
        assert_eq!(EbmsErrorCode::ValueInconsistent.code(), "EBMS:0004");
        assert_eq!(EbmsErrorCode::InvalidReceipt.code(), "EBMS:0006");
        assert_eq!(EbmsErrorCode::InvalidHeader.code(), "EBMS:0009");
        assert_eq!(EbmsErrorCode::ProcessingModeMismatch.code(), "EBMS:0010");
        assert_eq!(EbmsErrorCode::ExternalPayloadError.code(), "EBMS:0011");
    }

    #[test]
    fn test_catalog_severity_and_category() {
        assert_eq!(EbmsErrorCode::InvalidHeader.severity(), Severity::Failure);
        assert_eq!(
            EbmsErrorCode::ExternalPayloadError.category(),
            ErrorCategory::Unpackaging
        );
        assert_eq!(
            EbmsErrorCode::ProcessingModeMismatch.category(),
            ErrorCategory::Processing
        );
    }

    #[test]
    fn test_localized_descriptions_differ() {
        for code in [
            EbmsErrorCode::ValueNotRecognized,
            EbmsErrorCode::ValueInconsistent,
            EbmsErrorCode::InvalidReceipt,
            EbmsErrorCode::InvalidHeader,
            EbmsErrorCode::ProcessingModeMismatch,
            EbmsErrorCode::ExternalPayloadError,
        ] {
            assert_ne!(
                code.short_description(Locale::En),
                code.short_description(Locale::De)
            );
        }
    }

    #[test]
    fn test_locale_tags() {
        assert_eq!(Locale::from_tag("de"), Some(Locale::De));
        assert_eq!(Locale::from_tag("de-AT"), Some(Locale::De));
        assert_eq!(Locale::from_tag("en_US"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::default(), Locale::En);
    }

    #[test]
    fn test_error_list_accumulation() {
        let mut list = ErrorList::new();
        assert!(list.is_empty());

        list.push(EbmsErrorCode::InvalidHeader.as_error_with_detail(Locale::En, "missing Action"));
        list.push(EbmsErrorCode::ValueInconsistent.as_error(Locale::En));

        assert_eq!(list.len(), 2);
        assert_eq!(
            list.codes(),
            vec![EbmsErrorCode::InvalidHeader, EbmsErrorCode::ValueInconsistent]
        );
        assert_eq!(
            list.iter().next().unwrap().detail.as_deref(),
            Some("missing Action")
        );
    }
}
