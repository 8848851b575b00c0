//! SOAP header processor chain
//!
//! Header processors are registered under the qualified name of the header
//! element they understand. The chain walks the envelope's header children in
//! document order, dispatches each to its processor and short-circuits on the
//! first failure; state accumulated up to that point is kept for diagnostic
//! emission.

use crate::error::Result;
use crate::state::MessageState;
use as4gate_protocol::attachment::Attachment;
use as4gate_protocol::error::ErrorList;
use as4gate_protocol::soap::{QName, SoapDocument, XmlElement};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Two-valued outcome of a processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The step succeeded
    Success,
    /// The step failed; the error list explains why
    Failure,
}

impl Outcome {
    /// Whether this is [`Outcome::Success`]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether this is [`Outcome::Failure`]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failure)
    }
}

/// A processor for one recognized SOAP header element
pub trait SoapHeaderElementProcessor: Send + Sync {
    /// Process one header element of the inbound envelope
    ///
    /// ebMS-level faults are appended to `error_list` and reported as
    /// `Ok(Outcome::Failure)`; only structural collaborator faults surface
    /// as `Err`.
    fn process(
        &self,
        soap_document: &SoapDocument,
        header: &XmlElement,
        attachments: &mut Vec<Attachment>,
        state: &mut MessageState,
        error_list: &mut ErrorList,
    ) -> Result<Outcome>;
}

/// Dispatcher routing SOAP header elements to their processors by QName
#[derive(Clone, Default)]
pub struct SoapHeaderProcessorChain {
    processors: HashMap<QName, Arc<dyn SoapHeaderElementProcessor>>,
}

impl SoapHeaderProcessorChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor for a header element name
    pub fn register(
        &mut self,
        name: QName,
        processor: Arc<dyn SoapHeaderElementProcessor>,
    ) -> &mut Self {
        self.processors.insert(name, processor);
        self
    }

    /// The processor registered for a name, if any
    pub fn get(&self, name: &QName) -> Option<&Arc<dyn SoapHeaderElementProcessor>> {
        self.processors.get(name)
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether no processor is registered
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run the registered processors over the envelope's header children
    ///
    /// Headers appear in document order; headers without a registered
    /// processor are skipped. The first failing processor stops the chain.
    pub fn execute(
        &self,
        soap_document: &SoapDocument,
        attachments: &mut Vec<Attachment>,
        state: &mut MessageState,
        error_list: &mut ErrorList,
    ) -> Result<Outcome> {
        let Some(header) = soap_document.header() else {
            trace!("Envelope carries no SOAP header");
            return Ok(Outcome::Success);
        };

        for element in header.child_elements() {
            let Some(processor) = self.processors.get(&element.name) else {
                trace!("No processor registered for header element '{}'", element.name);
                continue;
            };

            debug!("Processing SOAP header element '{}'", element.name);
            let outcome =
                processor.process(soap_document, element, attachments, state, error_list)?;
            if outcome.is_failure() {
                debug!(
                    "Header processor for '{}' failed with {} error(s)",
                    element.name,
                    error_list.len()
                );
                return Ok(Outcome::Failure);
            }
        }

        Ok(Outcome::Success)
    }
}

impl std::fmt::Debug for SoapHeaderProcessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoapHeaderProcessorChain")
            .field("registered", &self.processors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as4gate_protocol::error::{EbmsErrorCode, Locale};
    use as4gate_protocol::soap::SoapVersion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Recording {
        order: Arc<AtomicUsize>,
        seen_at: AtomicUsize,
        fail: bool,
    }

    impl Recording {
        fn new(order: Arc<AtomicUsize>, fail: bool) -> Self {
            Self {
                order,
                seen_at: AtomicUsize::new(usize::MAX),
                fail,
            }
        }
    }

    impl SoapHeaderElementProcessor for Recording {
        fn process(
            &self,
            _soap_document: &SoapDocument,
            _header: &XmlElement,
            _attachments: &mut Vec<Attachment>,
            _state: &mut MessageState,
            error_list: &mut ErrorList,
        ) -> Result<Outcome> {
            let position = self.order.fetch_add(1, Ordering::SeqCst);
            self.seen_at.store(position, Ordering::SeqCst);
            if self.fail {
                error_list.push(EbmsErrorCode::ValueInconsistent.as_error(Locale::En));
                Ok(Outcome::Failure)
            } else {
                Ok(Outcome::Success)
            }
        }
    }

    fn envelope_with_headers(headers: Vec<XmlElement>) -> SoapDocument {
        let ns = SoapVersion::V12.namespace_uri();
        let mut header = XmlElement::new(QName::new(ns, "Header"));
        for h in headers {
            header = header.with_child(h);
        }
        SoapDocument::new(
            XmlElement::new(QName::new(ns, "Envelope"))
                .with_child(header)
                .with_child(XmlElement::new(QName::new(ns, "Body"))),
        )
    }

    #[test]
    fn test_dispatch_in_document_order() {
        let order = Arc::new(AtomicUsize::new(0));
        let first = Arc::new(Recording::new(order.clone(), false));
        let second = Arc::new(Recording::new(order.clone(), false));

        let mut chain = SoapHeaderProcessorChain::new();
        chain.register(QName::new("urn:a", "First"), first.clone());
        chain.register(QName::new("urn:b", "Second"), second.clone());

        let doc = envelope_with_headers(vec![
            XmlElement::new(QName::new("urn:b", "Second")),
            XmlElement::new(QName::new("urn:a", "First")),
        ]);

        let mut state = MessageState::new(Locale::En);
        let mut errors = ErrorList::new();
        let outcome = chain
            .execute(&doc, &mut Vec::new(), &mut state, &mut errors)
            .unwrap();

        assert!(outcome.is_success());
        // Envelope order wins over registration order
        assert_eq!(second.seen_at.load(Ordering::SeqCst), 0);
        assert_eq!(first.seen_at.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_short_circuits() {
        let order = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(Recording::new(order.clone(), true));
        let never_reached = Arc::new(Recording::new(order.clone(), false));

        let mut chain = SoapHeaderProcessorChain::new();
        chain.register(QName::new("urn:a", "Failing"), failing);
        chain.register(QName::new("urn:b", "After"), never_reached.clone());

        let doc = envelope_with_headers(vec![
            XmlElement::new(QName::new("urn:a", "Failing")),
            XmlElement::new(QName::new("urn:b", "After")),
        ]);

        let mut state = MessageState::new(Locale::En);
        let mut errors = ErrorList::new();
        let outcome = chain
            .execute(&doc, &mut Vec::new(), &mut state, &mut errors)
            .unwrap();

        assert!(outcome.is_failure());
        assert_eq!(errors.len(), 1);
        assert_eq!(never_reached.seen_at.load(Ordering::SeqCst), usize::MAX);
    }

    #[test]
    fn test_unknown_headers_are_skipped() {
        let chain = SoapHeaderProcessorChain::new();
        let doc = envelope_with_headers(vec![XmlElement::new(QName::new("urn:x", "Unknown"))]);

        let mut state = MessageState::new(Locale::En);
        let mut errors = ErrorList::new();
        let outcome = chain
            .execute(&doc, &mut Vec::new(), &mut state, &mut errors)
            .unwrap();

        assert!(outcome.is_success());
        assert!(errors.is_empty());
    }
}
