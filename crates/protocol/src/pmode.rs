//! Processing Modes
//!
//! A P-Mode is the bilateral configuration record governing how a message is
//! processed between two parties: which exchange pattern binding applies,
//! which legs exist and what each leg's protocol and business addressing look
//! like. How P-Modes are authored and stored is the host's business; the
//! engine only reads them.

use crate::soap::SoapVersion;
use serde::{Deserialize, Serialize};

/// Message exchange pattern bindings and their leg requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MepBinding {
    /// One-way, initiator pushes
    Push,
    /// One-way, responder pulls
    Pull,
    /// Two-way over a single connection
    Sync,
    /// Two-way, both halves pushed
    PushAndPush,
    /// Two-way, request pushed, reply pulled
    PushAndPull,
    /// Two-way, request pulled, reply pushed
    PullAndPush,
}

impl MepBinding {
    /// Number of configured legs this binding requires
    pub fn required_legs(self) -> u8 {
        match self {
            Self::Push | Self::Pull | Self::Sync => 1,
            Self::PushAndPush | Self::PushAndPull | Self::PullAndPush => 2,
        }
    }
}

/// A party as configured in a P-Mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PModeParty {
    /// Party identifier
    pub id: String,
    /// Expected role URI, if constrained
    pub role: Option<String>,
}

impl PModeParty {
    /// Create a party constraint on the identifier alone
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: None,
        }
    }
}

/// Transport protocol settings of one leg
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PModeLegProtocol {
    /// Endpoint address of the receiving MSH, if pinned
    pub address: Option<String>,
    /// SOAP version spoken on this leg
    pub soap_version: SoapVersion,
}

impl Default for PModeLegProtocol {
    fn default() -> Self {
        Self {
            address: None,
            soap_version: SoapVersion::V12,
        }
    }
}

/// Business addressing constraints of one leg
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PModeLegBusinessInfo {
    /// Expected service, if constrained
    pub service: Option<String>,
    /// Expected action, if constrained
    pub action: Option<String>,
    /// MPC messages on this leg belong to, if configured
    pub mpc_id: Option<String>,
}

/// One direction of a message exchange pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PModeLeg {
    /// Protocol settings
    pub protocol: PModeLegProtocol,
    /// Business addressing
    pub business_info: PModeLegBusinessInfo,
}

impl PModeLeg {
    /// Create a leg with the given SOAP version and otherwise default settings
    pub fn for_soap_version(soap_version: SoapVersion) -> Self {
        Self {
            protocol: PModeLegProtocol {
                address: None,
                soap_version,
            },
            business_info: PModeLegBusinessInfo::default(),
        }
    }
}

/// A processing mode: the bilateral agreement record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PMode {
    /// Unique P-Mode id; matching is case-sensitive
    pub id: String,
    /// Trading-partner agreement this P-Mode implements
    pub agreement: Option<String>,
    /// Exchange pattern binding
    pub mep_binding: MepBinding,
    /// Initiating party constraint
    pub initiator: Option<PModeParty>,
    /// Responding party constraint
    pub responder: Option<PModeParty>,
    /// First (request) leg
    pub leg1: PModeLeg,
    /// Second (reply) leg, for two-way bindings
    pub leg2: Option<PModeLeg>,
}

impl PMode {
    /// Create a one-leg P-Mode
    pub fn new(id: impl Into<String>, mep_binding: MepBinding, leg1: PModeLeg) -> Self {
        Self {
            id: id.into(),
            agreement: None,
            mep_binding,
            initiator: None,
            responder: None,
            leg1,
            leg2: None,
        }
    }

    /// Builder-style second leg
    pub fn with_leg2(mut self, leg2: PModeLeg) -> Self {
        self.leg2 = Some(leg2);
        self
    }

    /// Builder-style initiator constraint
    pub fn with_initiator(mut self, initiator: PModeParty) -> Self {
        self.initiator = Some(initiator);
        self
    }

    /// Builder-style responder constraint
    pub fn with_responder(mut self, responder: PModeParty) -> Self {
        self.responder = Some(responder);
        self
    }

    /// The leg with the given number, when configured
    pub fn leg(&self, number: u8) -> Option<&PModeLeg> {
        match number {
            1 => Some(&self.leg1),
            2 => self.leg2.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_legs() {
        assert_eq!(MepBinding::Push.required_legs(), 1);
        assert_eq!(MepBinding::Pull.required_legs(), 1);
        assert_eq!(MepBinding::Sync.required_legs(), 1);
        assert_eq!(MepBinding::PushAndPush.required_legs(), 2);
        assert_eq!(MepBinding::PushAndPull.required_legs(), 2);
        assert_eq!(MepBinding::PullAndPush.required_legs(), 2);
    }

    #[test]
    fn test_leg_lookup() {
        let pmode = PMode::new("pm-1", MepBinding::Push, PModeLeg::default());
        assert!(pmode.leg(1).is_some());
        assert!(pmode.leg(2).is_none());
        assert!(pmode.leg(3).is_none());

        let two_way = PMode::new("pm-2", MepBinding::PushAndPush, PModeLeg::default())
            .with_leg2(PModeLeg::for_soap_version(SoapVersion::V11));
        assert_eq!(
            two_way.leg(2).unwrap().protocol.soap_version,
            SoapVersion::V11
        );
    }
}
