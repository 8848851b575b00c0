//! P-Mode resolution interface and static catalog resolver
//!
//! Given the addressing data of an inbound user message, a resolver decides
//! which P-Mode governs it. Implementations may consult a static catalog, a
//! database or a derivation rule; resolution must be pure with respect to its
//! arguments within a single call.

use crate::error::Result;
use as4gate_protocol::pmode::PMode;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps message addressing data to a governing P-Mode
pub trait PModeResolver: Send + Sync {
    /// Resolve a P-Mode
    ///
    /// `pmode_id` is the candidate id from the agreement reference, when the
    /// message carried one. `responder_address` is the host's own address
    /// hint. `Ok(None)` means no P-Mode matches; `Err` means the resolver
    /// itself failed.
    fn resolve(
        &self,
        pmode_id: Option<&str>,
        service: &str,
        action: &str,
        initiator_id: &str,
        responder_id: &str,
        responder_address: Option<&str>,
    ) -> Result<Option<Arc<PMode>>>;
}

/// Resolver over a fixed catalog of P-Modes
///
/// An explicit P-Mode id wins and is matched case-sensitively. Without an id,
/// the first catalog entry whose leg-1 constraints are all compatible with
/// the message addressing wins, in registration order.
#[derive(Debug, Clone, Default)]
pub struct StaticPModeResolver {
    by_id: HashMap<String, Arc<PMode>>,
    ordered: Vec<Arc<PMode>>,
}

impl StaticPModeResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a P-Mode to the catalog
    pub fn register(&mut self, pmode: PMode) -> &mut Self {
        let pmode = Arc::new(pmode);
        self.by_id.insert(pmode.id.clone(), pmode.clone());
        self.ordered.push(pmode);
        self
    }

    /// Number of registered P-Modes
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    fn matches(
        pmode: &PMode,
        service: &str,
        action: &str,
        initiator_id: &str,
        responder_id: &str,
        responder_address: Option<&str>,
    ) -> bool {
        let business = &pmode.leg1.business_info;
        if business.service.as_deref().is_some_and(|s| s != service) {
            return false;
        }
        if business.action.as_deref().is_some_and(|a| a != action) {
            return false;
        }
        if pmode
            .initiator
            .as_ref()
            .is_some_and(|p| p.id != initiator_id)
        {
            return false;
        }
        if pmode
            .responder
            .as_ref()
            .is_some_and(|p| p.id != responder_id)
        {
            return false;
        }
        // An address pinned on leg 1 must agree with the host's own address
        if let (Some(pinned), Some(own)) =
            (pmode.leg1.protocol.address.as_deref(), responder_address)
        {
            if pinned != own {
                return false;
            }
        }
        true
    }
}

impl PModeResolver for StaticPModeResolver {
    fn resolve(
        &self,
        pmode_id: Option<&str>,
        service: &str,
        action: &str,
        initiator_id: &str,
        responder_id: &str,
        responder_address: Option<&str>,
    ) -> Result<Option<Arc<PMode>>> {
        if let Some(id) = pmode_id {
            return Ok(self.by_id.get(id).cloned());
        }

        Ok(self
            .ordered
            .iter()
            .find(|p| {
                Self::matches(p, service, action, initiator_id, responder_id, responder_address)
            })
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as4gate_protocol::pmode::{MepBinding, PModeLeg, PModeParty};

    fn pmode(id: &str) -> PMode {
        PMode::new(id, MepBinding::Push, PModeLeg::default())
    }

    fn constrained(id: &str, service: &str, action: &str) -> PMode {
        let mut p = pmode(id);
        p.leg1.business_info.service = Some(service.into());
        p.leg1.business_info.action = Some(action.into());
        p
    }

    #[test]
    fn test_resolution_by_id_is_case_sensitive() {
        let mut resolver = StaticPModeResolver::new();
        resolver.register(pmode("pm-1"));

        let hit = resolver
            .resolve(Some("pm-1"), "svc", "act", "a", "b", None)
            .unwrap();
        assert_eq!(hit.unwrap().id, "pm-1");

        let miss = resolver
            .resolve(Some("PM-1"), "svc", "act", "a", "b", None)
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_resolution_by_addressing() {
        let mut resolver = StaticPModeResolver::new();
        resolver.register(constrained("pm-order", "urn:svc:order", "Submit"));
        resolver.register(constrained("pm-invoice", "urn:svc:invoice", "Send"));

        let hit = resolver
            .resolve(None, "urn:svc:invoice", "Send", "a", "b", None)
            .unwrap();
        assert_eq!(hit.unwrap().id, "pm-invoice");

        let miss = resolver
            .resolve(None, "urn:svc:invoice", "Submit", "a", "b", None)
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_party_constraints() {
        let mut resolver = StaticPModeResolver::new();
        resolver.register(
            pmode("pm-constrained")
                .with_initiator(PModeParty::new("org:buyer"))
                .with_responder(PModeParty::new("org:seller")),
        );

        assert!(resolver
            .resolve(None, "svc", "act", "org:buyer", "org:seller", None)
            .unwrap()
            .is_some());
        assert!(resolver
            .resolve(None, "svc", "act", "org:intruder", "org:seller", None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unconstrained_pmode_matches_anything() {
        let mut resolver = StaticPModeResolver::new();
        resolver.register(pmode("pm-any"));

        let hit = resolver
            .resolve(None, "whatever", "anything", "a", "b", Some("https://gw.example.org"))
            .unwrap();
        assert_eq!(hit.unwrap().id, "pm-any");
    }
}
