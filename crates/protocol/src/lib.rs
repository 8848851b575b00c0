//! AS4 / ebMS 3.0 Protocol Core
//!
//! This crate contains the protocol data model for an AS4 message-handling
//! gateway: the SOAP document tree the engine consumes, the typed ebMS
//! `Messaging` header objects, the Messaging reader, Processing Modes
//! (P-Modes), Message Partition Channels (MPCs) and the ebMS error catalog.
//!
//! Everything here is plain data plus small accessors. XML text parsing, MIME
//! extraction and WS-Security live in the host; they hand this crate their
//! already-parsed results.

pub mod attachment;
pub mod compression;
pub mod error;
pub mod messaging;
pub mod mpc;
pub mod pmode;
pub mod reader;
pub mod soap;

pub use attachment::Attachment;
pub use compression::CompressionMode;
pub use error::{EbmsError, EbmsErrorCode, ErrorList, Locale, Severity};
pub use messaging::{Messaging, SignalMessage, UserMessage};
pub use mpc::Mpc;
pub use pmode::{MepBinding, PMode, PModeLeg};
pub use reader::{Diagnostic, DiagnosticSeverity, MessagingReader};
pub use soap::{QName, SoapDocument, SoapVersion, XmlElement};

/// Namespace URI of the ebMS 3.0 Core Specification schema
pub const EBMS_NS: &str = "http://docs.oasis-open.org/ebxml-msg/ebms/v3.0/ns/core/200704/";

/// Prefix used by `PartInfo/@href` references to MIME attachment content ids
pub const PREFIX_CID: &str = "cid:";
