//! Pluggable pull-request processors
//!
//! When a pull-request signal arrives, the host's processors are asked in
//! registration order which P-Mode should govern it; the first processor
//! returning one wins. The registry is an ordered set of capability values,
//! not a class hierarchy.

use crate::error::Result;
use as4gate_protocol::messaging::SignalMessage;
use as4gate_protocol::pmode::PMode;
use std::sync::Arc;
use tracing::debug;

/// Capability of resolving a signal message to a governing P-Mode
pub trait PullRequestProcessor: Send + Sync {
    /// Return the P-Mode governing this signal, if this processor claims it
    fn process(&self, signal: &SignalMessage) -> Result<Option<Arc<PMode>>>;
}

/// Ordered collection of pull-request processors
#[derive(Clone, Default)]
pub struct PullRequestProcessorRegistry {
    processors: Vec<Arc<dyn PullRequestProcessor>>,
}

impl PullRequestProcessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor; order of registration is order of consultation
    pub fn register(&mut self, processor: Arc<dyn PullRequestProcessor>) -> &mut Self {
        self.processors.push(processor);
        self
    }

    /// Number of registered processors
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether no processor is registered
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Ask each processor in order; the first returned P-Mode wins
    pub fn first_pmode(&self, signal: &SignalMessage) -> Result<Option<Arc<PMode>>> {
        for processor in &self.processors {
            if let Some(pmode) = processor.process(signal)? {
                debug!(
                    "Pull-request processor selected P-Mode '{}' for signal '{}'",
                    pmode.id, signal.message_info.message_id
                );
                return Ok(Some(pmode));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for PullRequestProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullRequestProcessorRegistry")
            .field("processors", &self.processors.len())
            .finish()
    }
}
