//! MPC registry interface and in-memory implementation
//!
//! The registry answers which message partition channels exist. It is shared
//! across concurrent requests and read-only from the engine's perspective;
//! hosts that reload channels must publish a fresh registry instance.

use as4gate_protocol::mpc::Mpc;
use std::collections::HashMap;
use std::sync::Arc;

/// Lookup of message partition channels by id
pub trait MpcRegistry: Send + Sync {
    /// Whether a channel with this id exists
    fn contains(&self, id: &str) -> bool;

    /// The channel with this id, if it exists
    fn get(&self, id: &str) -> Option<Arc<Mpc>>;

    /// The channel with this id, falling back to the default channel when no
    /// id is given
    ///
    /// Used exclusively for effective-MPC resolution of user messages; an
    /// unknown non-empty id still yields `None`.
    fn get_or_default(&self, id: Option<&str>) -> Option<Arc<Mpc>>;
}

/// Registry backed by a map built at configuration time
#[derive(Debug, Clone)]
pub struct InMemoryMpcRegistry {
    mpcs: HashMap<String, Arc<Mpc>>,
    default_id: String,
}

impl InMemoryMpcRegistry {
    /// Create a registry seeded with the specification default MPC
    pub fn new() -> Self {
        let default = Arc::new(Mpc::default_mpc());
        let mut mpcs = HashMap::new();
        mpcs.insert(default.id.clone(), default.clone());
        Self {
            mpcs,
            default_id: default.id.clone(),
        }
    }

    /// Register a channel
    pub fn register(&mut self, mpc: Mpc) -> &mut Self {
        self.mpcs.insert(mpc.id.clone(), Arc::new(mpc));
        self
    }

    /// Id of the channel used when a message names none
    pub fn default_id(&self) -> &str {
        &self.default_id
    }
}

impl Default for InMemoryMpcRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MpcRegistry for InMemoryMpcRegistry {
    fn contains(&self, id: &str) -> bool {
        self.mpcs.contains_key(id)
    }

    fn get(&self, id: &str) -> Option<Arc<Mpc>> {
        self.mpcs.get(id).cloned()
    }

    fn get_or_default(&self, id: Option<&str>) -> Option<Arc<Mpc>> {
        let effective = match id {
            Some(id) if !id.is_empty() => id,
            _ => &self.default_id,
        };
        self.get(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as4gate_protocol::mpc::DEFAULT_MPC_ID;

    #[test]
    fn test_default_mpc_is_seeded() {
        let registry = InMemoryMpcRegistry::new();
        assert!(registry.contains(DEFAULT_MPC_ID));
        assert_eq!(registry.default_id(), DEFAULT_MPC_ID);
    }

    #[test]
    fn test_strict_lookup() {
        let mut registry = InMemoryMpcRegistry::new();
        registry.register(Mpc::new("urn:mpc:prio"));

        assert!(registry.contains("urn:mpc:prio"));
        assert_eq!(registry.get("urn:mpc:prio").unwrap().id, "urn:mpc:prio");
        assert!(registry.get("urn:mpc:unknown").is_none());
    }

    #[test]
    fn test_default_fallback() {
        let mut registry = InMemoryMpcRegistry::new();
        registry.register(Mpc::new("urn:mpc:prio"));

        // No id and empty id both fall back to the default channel
        assert_eq!(registry.get_or_default(None).unwrap().id, DEFAULT_MPC_ID);
        assert_eq!(registry.get_or_default(Some("")).unwrap().id, DEFAULT_MPC_ID);
        // A known id resolves to its channel
        assert_eq!(
            registry.get_or_default(Some("urn:mpc:prio")).unwrap().id,
            "urn:mpc:prio"
        );
        // An unknown id does not silently fall back
        assert!(registry.get_or_default(Some("urn:mpc:unknown")).is_none());
    }
}
