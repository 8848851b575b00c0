//! SOAP document model consumed by the inbound engine
//!
//! The gateway does not parse XML text itself; the host's XML stack produces
//! this namespace-aware element tree and hands it over together with the MIME
//! attachments. The types here carry exactly the structure the header
//! processors need: qualified names, attributes, child nodes.

use serde::{Deserialize, Serialize};

/// Supported SOAP envelope versions, selected by the P-Mode leg protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoapVersion {
    /// SOAP 1.1
    V11,
    /// SOAP 1.2
    V12,
}

impl SoapVersion {
    /// Envelope namespace URI of this version
    pub fn namespace_uri(self) -> &'static str {
        match self {
            Self::V11 => "http://schemas.xmlsoap.org/soap/envelope/",
            Self::V12 => "http://www.w3.org/2003/05/soap-envelope",
        }
    }

    /// MIME media type of an envelope of this version
    pub fn media_type(self) -> &'static str {
        match self {
            Self::V11 => "text/xml",
            Self::V12 => "application/soap+xml",
        }
    }

    /// Local name of the body element (identical for both versions)
    pub fn body_element_name(self) -> &'static str {
        "Body"
    }

    /// Local name of the header element
    pub fn header_element_name(self) -> &'static str {
        "Header"
    }

    /// Match an envelope namespace URI back to a version
    pub fn from_namespace_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://schemas.xmlsoap.org/soap/envelope/" => Some(Self::V11),
            "http://www.w3.org/2003/05/soap-envelope" => Some(Self::V12),
            _ => None,
        }
    }
}

impl std::fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V11 => write!(f, "SOAP 1.1"),
            Self::V12 => write!(f, "SOAP 1.2"),
        }
    }
}

/// Qualified XML name: namespace URI plus local name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, empty for unqualified names
    pub namespace_uri: String,
    /// Local part of the name
    pub local_name: String,
}

impl QName {
    /// Create a qualified name
    pub fn new(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a name in the ebMS 3.0 core namespace
    pub fn ebms(local_name: impl Into<String>) -> Self {
        Self::new(crate::EBMS_NS, local_name)
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}

/// Attribute of an element; ebMS attributes are unqualified, so a local name
/// suffices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: String,
}

/// A node inside an element: child element or character data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Text content
    Text(String),
}

/// Namespace-aware XML element as produced by the host parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Qualified element name
    pub name: QName,
    /// Attributes in document order
    pub attributes: Vec<XmlAttribute>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute append
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builder-style child element append
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style text append
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Value of the named attribute, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let XmlNode::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }

    /// Iterator over direct child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given local name, namespace ignored
    pub fn first_child_element(&self, local_name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.name.local_name == local_name)
    }

    /// All direct child elements with the given local name
    pub fn child_elements_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.child_elements().filter(move |e| e.name.local_name == local_name)
    }

    /// Whether the element has any child nodes, text included
    pub fn has_child_nodes(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A parsed inbound SOAP document, rooted at the envelope element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapDocument {
    envelope: XmlElement,
}

impl SoapDocument {
    /// Wrap an envelope element
    pub fn new(envelope: XmlElement) -> Self {
        Self { envelope }
    }

    /// Wrap an envelope element, checking it actually is one
    ///
    /// Transport adapters use this at the trust boundary; anything that is
    /// not an `Envelope` in a known SOAP namespace is rejected before the
    /// header chain ever runs.
    pub fn from_envelope(envelope: XmlElement) -> crate::error::Result<Self> {
        if envelope.name.local_name != "Envelope" {
            return Err(crate::error::ProtocolError::UnexpectedElement {
                expected: "Envelope".to_string(),
                actual: envelope.name.to_string(),
            });
        }
        if SoapVersion::from_namespace_uri(&envelope.name.namespace_uri).is_none() {
            return Err(crate::error::ProtocolError::Validation(format!(
                "'{}' is not a SOAP envelope namespace",
                envelope.name.namespace_uri
            )));
        }
        Ok(Self { envelope })
    }

    /// The envelope element
    pub fn envelope(&self) -> &XmlElement {
        &self.envelope
    }

    /// SOAP version derived from the envelope namespace
    pub fn version(&self) -> Option<SoapVersion> {
        SoapVersion::from_namespace_uri(&self.envelope.name.namespace_uri)
    }

    /// The header element of the envelope, if any
    pub fn header(&self) -> Option<&XmlElement> {
        self.envelope.first_child_element("Header")
    }

    /// The body element for the given SOAP version, if any
    pub fn body(&self, version: SoapVersion) -> Option<&XmlElement> {
        self.envelope.first_child_element(version.body_element_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_11() -> XmlElement {
        XmlElement::new(QName::new(SoapVersion::V11.namespace_uri(), "Envelope"))
            .with_child(XmlElement::new(QName::new(
                SoapVersion::V11.namespace_uri(),
                "Header",
            )))
            .with_child(XmlElement::new(QName::new(
                SoapVersion::V11.namespace_uri(),
                "Body",
            )))
    }

    #[test]
    fn test_version_catalog() {
        assert_eq!(SoapVersion::V11.media_type(), "text/xml");
        assert_eq!(SoapVersion::V12.media_type(), "application/soap+xml");
        assert_eq!(SoapVersion::V11.body_element_name(), "Body");
        assert_eq!(
            SoapVersion::from_namespace_uri("http://www.w3.org/2003/05/soap-envelope"),
            Some(SoapVersion::V12)
        );
        assert_eq!(SoapVersion::from_namespace_uri("urn:nonsense"), None);
    }

    #[test]
    fn test_qname_display() {
        assert_eq!(
            QName::ebms("Messaging").to_string(),
            format!("{{{}}}Messaging", crate::EBMS_NS)
        );
        assert_eq!(QName::new("", "plain").to_string(), "plain");
    }

    #[test]
    fn test_element_accessors() {
        let el = XmlElement::new(QName::new("", "PartInfo"))
            .with_attribute("href", "cid:att-1")
            .with_child(XmlElement::new(QName::new("", "PartProperties")))
            .with_text("ignored");

        assert_eq!(el.attribute("href"), Some("cid:att-1"));
        assert_eq!(el.attribute("missing"), None);
        assert!(el.first_child_element("PartProperties").is_some());
        assert!(el.first_child_element("Nope").is_none());
        assert_eq!(el.text(), "ignored");
        assert!(el.has_child_nodes());
        assert!(!XmlElement::new(QName::new("", "Empty")).has_child_nodes());
    }

    #[test]
    fn test_document_accessors() {
        let doc = SoapDocument::new(envelope_11());
        assert_eq!(doc.version(), Some(SoapVersion::V11));
        assert!(doc.header().is_some());
        assert!(doc.body(SoapVersion::V11).is_some());
        assert!(!doc.body(SoapVersion::V11).unwrap().has_child_nodes());
    }

    #[test]
    fn test_from_envelope_checks_the_root() {
        assert!(SoapDocument::from_envelope(envelope_11()).is_ok());

        let wrong_name = XmlElement::new(QName::new(SoapVersion::V11.namespace_uri(), "Body"));
        assert!(SoapDocument::from_envelope(wrong_name).is_err());

        let wrong_ns = XmlElement::new(QName::new("urn:not-soap", "Envelope"));
        assert!(SoapDocument::from_envelope(wrong_ns).is_err());
    }
}
