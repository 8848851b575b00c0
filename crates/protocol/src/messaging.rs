//! Typed ebMS 3.0 `Messaging` header objects
//!
//! This module mirrors the ebMS schema: an envelope carries one `Messaging`
//! header which holds user messages (business payload descriptions) and
//! signal messages (pull requests, receipts, transported errors). Instances
//! are produced by [`crate::reader::MessagingReader`] from the host-parsed
//! SOAP tree.

use crate::soap::XmlElement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope-level container for user and signal messages
///
/// The schema allows both lists; the processing rules require exactly one
/// message across both. Cardinality is enforced by the header processor, not
/// here, so that a structurally odd message can still be recorded in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Messaging {
    /// Contained user messages
    pub user_messages: Vec<UserMessage>,
    /// Contained signal messages
    pub signal_messages: Vec<SignalMessage>,
}

impl Messaging {
    /// Number of contained user messages
    pub fn user_message_count(&self) -> usize {
        self.user_messages.len()
    }

    /// Number of contained signal messages
    pub fn signal_message_count(&self) -> usize {
        self.signal_messages.len()
    }

    /// First user message, if any
    pub fn first_user_message(&self) -> Option<&UserMessage> {
        self.user_messages.first()
    }

    /// First signal message, if any
    pub fn first_signal_message(&self) -> Option<&SignalMessage> {
        self.signal_messages.first()
    }
}

/// Message identification and threading data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    /// Globally unique message id
    pub message_id: String,
    /// Id of the message this one replies to or acknowledges
    pub ref_to_message_id: Option<String>,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
}

impl MessageInfo {
    /// Create message info with the given id and the current time
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            ref_to_message_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create message info with a generated `<uuid>@<host>` id
    pub fn with_generated_id(host: &str) -> Self {
        Self::new(format!("{}@{}", Uuid::new_v4(), host))
    }

    /// Builder-style reference to a prior message
    pub fn with_ref_to_message_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_to_message_id = Some(ref_id.into());
        self
    }
}

/// Single party identifier with optional type qualifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyId {
    /// Identifier scheme, if qualified
    pub id_type: Option<String>,
    /// Identifier value
    pub value: String,
}

impl PartyId {
    /// Create an unqualified party id
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id_type: None,
            value: value.into(),
        }
    }
}

/// One side of the exchange: role plus party identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Role URI of this party
    pub role: String,
    /// Party identifiers; the processing rules allow exactly one
    pub party_ids: Vec<PartyId>,
}

/// Sending and receiving party of a user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    /// Sending party
    pub from: Party,
    /// Receiving party
    pub to: Party,
}

/// Reference to the trading-partner agreement governing the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementRef {
    /// Agreement identifier
    pub value: String,
    /// Candidate P-Mode id carried alongside the agreement
    pub pmode: Option<String>,
}

/// Business service addressed by a user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service type qualifier
    pub service_type: Option<String>,
    /// Service value
    pub value: String,
}

/// Collaboration context of a user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationInfo {
    /// Optional agreement reference
    pub agreement_ref: Option<AgreementRef>,
    /// Addressed service
    pub service: Service,
    /// Addressed action within the service
    pub action: String,
    /// Conversation this message belongs to
    pub conversation_id: String,
}

/// Generic name/value property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property value
    pub value: String,
}

impl Property {
    /// Create a property
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Descriptor of one payload part
///
/// A part without `href` lives in the SOAP body; a part with an `href`
/// references a MIME attachment by `cid:` content id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartInfo {
    /// Attachment reference, absent for the SOAP body payload
    pub href: Option<String>,
    /// Part properties (MimeType, CompressionType, CharacterSet, ...)
    pub part_properties: Vec<Property>,
}

/// Declared payload parts of a user message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadInfo {
    /// Declared parts in document order
    pub part_infos: Vec<PartInfo>,
}

/// A business message exchanged between two parties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessage {
    /// Identification and threading
    pub message_info: MessageInfo,
    /// Sender and receiver
    pub party_info: PartyInfo,
    /// Collaboration context
    pub collaboration_info: CollaborationInfo,
    /// Message-level properties
    pub message_properties: Vec<Property>,
    /// Declared payload parts
    pub payload_info: Option<PayloadInfo>,
    /// Message partition channel override
    pub mpc: Option<String>,
}

/// Request to deliver any message queued on an MPC
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Targeted message partition channel
    pub mpc: Option<String>,
}

/// Acknowledgement of a previously received message
///
/// The receipt content (e.g. non-repudiation information) is opaque to this
/// stage and carried through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt child elements, untouched
    pub content: Vec<XmlElement>,
}

/// An error entry transported inside an incoming signal message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalError {
    /// ebMS error code, e.g. `EBMS:0004`
    pub error_code: String,
    /// Severity as transmitted
    pub severity: String,
    /// Optional error category
    pub category: Option<String>,
    /// Id of the message the error refers to
    pub ref_to_message_in_error: Option<String>,
    /// Short description
    pub short_description: Option<String>,
    /// Long description
    pub description: Option<String>,
    /// Technical detail
    pub error_detail: Option<String>,
}

/// A signal message: pull request, receipt or transported errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMessage {
    /// Identification and threading
    pub message_info: MessageInfo,
    /// Pull request, if this signal is one
    pub pull_request: Option<PullRequest>,
    /// Receipt, if this signal is one
    pub receipt: Option<Receipt>,
    /// Transported error entries
    pub errors: Vec<SignalError>,
}
