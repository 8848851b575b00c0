//! Per-request message state
//!
//! One [`MessageState`] accompanies one inbound envelope through the header
//! processor chain: created empty when the envelope is received, progressively
//! populated by the processors, consumed by the dispatch stage and discarded
//! once the response is written. The state owns its slot values; P-Modes and
//! MPCs are shared read-only records behind `Arc`.

use as4gate_protocol::attachment::Attachment;
use as4gate_protocol::compression::CompressionMode;
use as4gate_protocol::error::Locale;
use as4gate_protocol::messaging::Messaging;
use as4gate_protocol::mpc::Mpc;
use as4gate_protocol::pmode::{PMode, PModeLeg};
use as4gate_protocol::soap::SoapDocument;
use std::collections::HashMap;
use std::sync::Arc;

/// The P-Mode leg selected for the current message
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivePModeLeg {
    /// Leg number, 1 or 2
    pub number: u8,
    /// The selected leg
    pub leg: PModeLeg,
}

/// Accumulator for everything the header processors learn about one message
#[derive(Debug, Clone, Default)]
pub struct MessageState {
    locale: Locale,
    messaging: Option<Messaging>,
    pmode: Option<Arc<PMode>>,
    effective_pmode_leg: Option<EffectivePModeLeg>,
    mpc: Option<Arc<Mpc>>,
    initiator_id: Option<String>,
    responder_id: Option<String>,
    soap_body_payload_present: bool,
    original_soap_document: Option<SoapDocument>,
    original_attachments: Vec<Attachment>,
    compressed_attachment_ids: HashMap<String, CompressionMode>,
}

impl MessageState {
    /// Create an empty state for one inbound message
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            ..Self::default()
        }
    }

    /// Locale used for error texts of this request
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// The parsed Messaging header, once extracted
    ///
    /// Present even for messages that subsequently failed validation; it is
    /// the ground-truth structural record used for diagnostic emission.
    pub fn messaging(&self) -> Option<&Messaging> {
        self.messaging.as_ref()
    }

    /// Record the parsed Messaging header
    pub fn set_messaging(&mut self, messaging: Messaging) {
        self.messaging = Some(messaging);
    }

    /// The governing P-Mode, once resolved
    pub fn pmode(&self) -> Option<&Arc<PMode>> {
        self.pmode.as_ref()
    }

    /// Record the governing P-Mode
    pub fn set_pmode(&mut self, pmode: Option<Arc<PMode>>) {
        self.pmode = pmode;
    }

    /// The selected P-Mode leg, once determined
    pub fn effective_pmode_leg(&self) -> Option<&EffectivePModeLeg> {
        self.effective_pmode_leg.as_ref()
    }

    /// Record the selected P-Mode leg
    pub fn set_effective_pmode_leg(&mut self, number: u8, leg: PModeLeg) {
        self.effective_pmode_leg = Some(EffectivePModeLeg { number, leg });
    }

    /// The effective MPC of a user message, once resolved
    pub fn mpc(&self) -> Option<&Arc<Mpc>> {
        self.mpc.as_ref()
    }

    /// Record the effective MPC
    pub fn set_mpc(&mut self, mpc: Option<Arc<Mpc>>) {
        self.mpc = mpc;
    }

    /// Party id of the initiator (the `From` party)
    pub fn initiator_id(&self) -> Option<&str> {
        self.initiator_id.as_deref()
    }

    /// Record the initiator party id
    pub fn set_initiator_id(&mut self, id: Option<String>) {
        self.initiator_id = id;
    }

    /// Party id of the responder (the `To` party)
    pub fn responder_id(&self) -> Option<&str> {
        self.responder_id.as_deref()
    }

    /// Record the responder party id
    pub fn set_responder_id(&mut self, id: Option<String>) {
        self.responder_id = id;
    }

    /// Whether the SOAP body of the inbound envelope carries a payload
    pub fn soap_body_payload_present(&self) -> bool {
        self.soap_body_payload_present
    }

    /// Record SOAP body payload presence
    pub fn set_soap_body_payload_present(&mut self, present: bool) {
        self.soap_body_payload_present = present;
    }

    /// The inbound SOAP document as received
    pub fn original_soap_document(&self) -> Option<&SoapDocument> {
        self.original_soap_document.as_ref()
    }

    /// Record the inbound SOAP document
    pub fn set_original_soap_document(&mut self, document: SoapDocument) {
        self.original_soap_document = Some(document);
    }

    /// The inbound MIME attachments as received
    pub fn original_attachments(&self) -> &[Attachment] {
        &self.original_attachments
    }

    /// Take ownership of the inbound attachments
    pub fn set_original_attachments(&mut self, attachments: Vec<Attachment>) {
        self.original_attachments = attachments;
    }

    /// Map of attachment content id to declared compression mode
    pub fn compressed_attachment_ids(&self) -> &HashMap<String, CompressionMode> {
        &self.compressed_attachment_ids
    }

    /// Record the declared attachment compression modes
    pub fn set_compressed_attachment_ids(&mut self, ids: HashMap<String, CompressionMode>) {
        self.compressed_attachment_ids = ids;
    }

    /// Whether the given attachment id was declared compressed
    pub fn is_attachment_compressed(&self, attachment_id: &str) -> bool {
        self.compressed_attachment_ids.contains_key(attachment_id)
    }
}
