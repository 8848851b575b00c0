//! AS4 payload compression catalog
//!
//! The AS4 profile admits exactly one compression type for payload parts,
//! declared through the `CompressionType` part property. Anything else is
//! rejected during header processing.

use serde::{Deserialize, Serialize};

/// Recognized payload compression modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// GZIP, MIME type `application/gzip`
    Gzip,
}

impl CompressionMode {
    /// MIME type string identifying this mode
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Gzip => "application/gzip",
        }
    }

    /// Conventional file extension of compressed content
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
        }
    }

    /// Look up a mode by its MIME type string; the match is exact
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        match mime_type {
            "application/gzip" => Some(Self::Gzip),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}
