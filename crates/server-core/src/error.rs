//! Engine error types
//!
//! Only structural faults live here: a collaborator (resolver, pull-request
//! processor) that could not do its work at all. Protocol-level faults are
//! reported through the ebMS error list instead and never surface as `Err`.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Structural engine faults that propagate to the request handler
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// The P-Mode resolver failed (e.g. its backing store is unreachable)
    #[error("P-Mode resolution failed: {message}")]
    PModeResolver {
        /// Collaborator-supplied description
        message: String,
    },

    /// A pull-request processor failed
    #[error("Pull-request processing failed: {message}")]
    PullRequestProcessor {
        /// Collaborator-supplied description
        message: String,
    },
}

impl EngineError {
    /// Fault raised by a P-Mode resolver implementation
    pub fn pmode_resolver(message: impl Into<String>) -> Self {
        Self::PModeResolver {
            message: message.into(),
        }
    }

    /// Fault raised by a pull-request processor implementation
    pub fn pull_request_processor(message: impl Into<String>) -> Self {
        Self::PullRequestProcessor {
            message: message.into(),
        }
    }
}
