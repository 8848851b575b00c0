//! Inbound MIME attachment view
//!
//! Attachments are extracted by the MIME stage; the engine sees them as
//! content id, media type and payload bytes. The only mutation the header
//! pipeline performs is recording the charset declared via the
//! `CharacterSet` part property.

pub use encoding_rs::Encoding;

/// A single MIME attachment of an inbound message
#[derive(Debug, Clone)]
pub struct Attachment {
    id: String,
    media_type: String,
    charset: Option<&'static Encoding>,
    data: Vec<u8>,
}

impl Attachment {
    /// Create an attachment without payload bytes
    pub fn new(id: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_type: media_type.into(),
            charset: None,
            data: Vec::new(),
        }
    }

    /// Builder-style payload bytes
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// MIME content id, without the `cid:` prefix
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared media type
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Charset recorded from the message header, if any
    pub fn charset(&self) -> Option<&'static Encoding> {
        self.charset
    }

    /// Record the declared charset
    pub fn set_charset(&mut self, charset: &'static Encoding) {
        self.charset = Some(charset);
    }

    /// Payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Resolve a charset label to its canonical encoding, if known
pub fn charset_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}
