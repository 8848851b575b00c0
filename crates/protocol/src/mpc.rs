//! Message Partition Channels
//!
//! An MPC is a named logical queue for pull-style delivery. Every user
//! message is associated with exactly one, falling back to the AS4 default
//! channel when neither the message nor the P-Mode names one.

use serde::{Deserialize, Serialize};

/// Id of the default MPC defined by the ebMS 3.0 core specification
pub const DEFAULT_MPC_ID: &str =
    "http://docs.oasis-open.org/ebxml-msg/ebms/v3.0/ns/core/200704/defaultMPC";

/// A message partition channel, identified by URI
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mpc {
    /// Channel URI
    pub id: String,
}

impl Mpc {
    /// Create an MPC with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The specification-defined default MPC
    pub fn default_mpc() -> Self {
        Self::new(DEFAULT_MPC_ID)
    }
}

impl std::fmt::Display for Mpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mpc() {
        let mpc = Mpc::default_mpc();
        assert_eq!(mpc.id, DEFAULT_MPC_ID);
        assert_eq!(mpc.to_string(), DEFAULT_MPC_ID);
    }
}
