//! AS4 Inbound Engine
//!
//! This crate decides, for every incoming SOAP envelope, whether it is a
//! well-formed ebMS message, which P-Mode governs it, whether attachments,
//! compression, MPC and party information are mutually consistent with that
//! P-Mode, and what downstream action applies. The envelope arrives as a
//! parsed tree plus extracted MIME attachments; the result is a populated
//! [`MessageState`] or an ebMS [`ErrorList`](as4gate_protocol::ErrorList).
//!
//! The engine is synchronous and thread-confined per request. Its shared
//! collaborators (P-Mode resolver, MPC registry, pull-request processors) are
//! injected at construction and only ever read.

pub mod chain;
pub mod error;
pub mod messaging;
pub mod mpc_registry;
pub mod pmode_resolver;
pub mod pull;
pub mod state;

pub use chain::{Outcome, SoapHeaderElementProcessor, SoapHeaderProcessorChain};
pub use error::{EngineError, Result};
pub use messaging::MessagingHeaderProcessor;
pub use mpc_registry::{InMemoryMpcRegistry, MpcRegistry};
pub use pmode_resolver::{PModeResolver, StaticPModeResolver};
pub use pull::{PullRequestProcessor, PullRequestProcessorRegistry};
pub use state::{EffectivePModeLeg, MessageState};
