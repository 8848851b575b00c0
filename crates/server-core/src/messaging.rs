//! The ebMS `Messaging` SOAP header element processor
//!
//! This processor carries the bulk of the protocol's admissibility rules: it
//! deserializes the `Messaging` header, cross-validates it against the MIME
//! attachments and the resolved P-Mode, and populates the per-request
//! [`MessageState`]. ebMS-level faults are appended to the error list and
//! reported as [`Outcome::Failure`]; they are never returned as `Err`.

use crate::chain::{Outcome, SoapHeaderElementProcessor};
use crate::error::Result;
use crate::mpc_registry::MpcRegistry;
use crate::pmode_resolver::PModeResolver;
use crate::pull::PullRequestProcessorRegistry;
use crate::state::MessageState;
use as4gate_protocol::attachment::{charset_for_label, Attachment};
use as4gate_protocol::compression::CompressionMode;
use as4gate_protocol::error::{EbmsErrorCode, ErrorList};
use as4gate_protocol::messaging::UserMessage;
use as4gate_protocol::mpc::Mpc;
use as4gate_protocol::pmode::{PMode, PModeLeg};
use as4gate_protocol::reader::MessagingReader;
use as4gate_protocol::soap::{QName, SoapDocument, XmlElement};
use as4gate_protocol::PREFIX_CID;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Part property declaring the original MIME type of a payload part
const PART_PROPERTY_MIME_TYPE: &str = "MimeType";
/// Part property declaring the compression applied to a payload part
const PART_PROPERTY_COMPRESSION_TYPE: &str = "CompressionType";
/// Part property declaring the character set of a payload part
const PART_PROPERTY_CHARACTER_SET: &str = "CharacterSet";

/// Processor for the ebMS `Messaging` header element
pub struct MessagingHeaderProcessor {
    pmode_resolver: Arc<dyn PModeResolver>,
    mpc_registry: Arc<dyn MpcRegistry>,
    pull_processors: PullRequestProcessorRegistry,
    server_address: Option<String>,
}

impl MessagingHeaderProcessor {
    /// Create the processor with its shared collaborators
    ///
    /// `server_address` is the host's own address, passed to P-Mode
    /// resolution as the responder-address hint.
    pub fn new(
        pmode_resolver: Arc<dyn PModeResolver>,
        mpc_registry: Arc<dyn MpcRegistry>,
        pull_processors: PullRequestProcessorRegistry,
        server_address: Option<String>,
    ) -> Self {
        Self {
            pmode_resolver,
            mpc_registry,
            pull_processors,
            server_address,
        }
    }

    /// Qualified name of the header element this processor handles
    pub fn qname() -> QName {
        QName::ebms("Messaging")
    }

    /// Whether leg 1 applies to this user message
    ///
    /// Leg 2 is the reply leg; it is addressed by a genuine reference to a
    /// prior message.
    fn use_leg1(user_message: &UserMessage) -> bool {
        let this_id = user_message.message_info.message_id.as_str();
        let ref_id = user_message
            .message_info
            .ref_to_message_id
            .as_deref()
            .unwrap_or("");

        if !ref_id.is_empty() && ref_id == this_id {
            warn!("MessageId and RefToMessageId are the same ('{this_id}')");
        }

        ref_id.is_empty() || ref_id == this_id
    }

    /// The MPC id governing a user message: the message's own, or the leg's
    fn effective_mpc_id<'a>(user_message: &'a UserMessage, leg: &'a PModeLeg) -> Option<&'a str> {
        user_message
            .mpc
            .as_deref()
            .or(leg.business_info.mpc_id.as_deref())
    }

    /// Any MPC named by the P-Mode leg must exist in the registry
    fn check_pmode_mpc(&self, leg: &PModeLeg, state: &MessageState, error_list: &mut ErrorList) -> Outcome {
        if let Some(mpc_id) = leg.business_info.mpc_id.as_deref() {
            if !self.mpc_registry.contains(mpc_id) {
                error!("P-Mode references the unknown MPC id '{mpc_id}'");
                error_list.push(EbmsErrorCode::ProcessingModeMismatch.as_error(state.locale()));
                return Outcome::Failure;
            }
        }
        Outcome::Success
    }

    /// Whether the envelope's body element for the leg's SOAP version carries
    /// any child nodes
    fn soap_body_has_payload(leg: &PModeLeg, soap_document: &SoapDocument) -> bool {
        soap_document
            .envelope()
            .first_child_element(leg.protocol.soap_version.body_element_name())
            .map(XmlElement::has_child_nodes)
            .unwrap_or(false)
    }
}

impl SoapHeaderElementProcessor for MessagingHeaderProcessor {
    fn process(
        &self,
        soap_document: &SoapDocument,
        header: &XmlElement,
        attachments: &mut Vec<Attachment>,
        state: &mut MessageState,
        error_list: &mut ErrorList,
    ) -> Result<Outcome> {
        let locale = state.locale();
        let mut pmode: Option<Arc<PMode>> = None;
        let mut effective_mpc: Option<Arc<Mpc>> = None;
        let mut initiator_id: Option<String> = None;
        let mut responder_id: Option<String> = None;
        let mut compressed_attachment_ids: HashMap<String, CompressionMode> = HashMap::new();

        // Parse the Messaging element, collecting schema diagnostics
        let mut diagnostics = Vec::new();
        let Some(messaging) = MessagingReader::new().read(header, &mut diagnostics) else {
            // Not well-formed against the ebMS schema
            for diagnostic in &diagnostics {
                error_list.push(
                    EbmsErrorCode::InvalidHeader
                        .as_error_with_detail(locale, diagnostic.to_string()),
                );
            }
            return Ok(Outcome::Failure);
        };

        // Remember in state, even if checks below fail
        state.set_messaging(messaging.clone());

        // 0 or 1 of each are allowed
        let user_messages = messaging.user_message_count();
        if user_messages > 1 {
            error!("Too many UserMessage objects ({user_messages}) contained");
            error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
            return Ok(Outcome::Failure);
        }

        let signal_messages = messaging.signal_message_count();
        if signal_messages > 1 {
            error!("Too many SignalMessage objects ({signal_messages}) contained");
            error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
            return Ok(Outcome::Failure);
        }

        if user_messages + signal_messages == 0 {
            error!("Neither UserMessage nor SignalMessage object contained");
            error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
            return Ok(Outcome::Failure);
        }

        if let Some(user_message) = messaging.first_user_message() {
            let from_party_ids = &user_message.party_info.from.party_ids;
            let to_party_ids = &user_message.party_info.to.party_ids;

            if from_party_ids.len() > 1 || to_party_ids.len() > 1 {
                error!("More than one PartyId contained in From or To");
                error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                return Ok(Outcome::Failure);
            }
            let (Some(from_party_id), Some(to_party_id)) =
                (from_party_ids.first(), to_party_ids.first())
            else {
                error!("From or To contains no PartyId");
                error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                return Ok(Outcome::Failure);
            };
            initiator_id = Some(from_party_id.value.clone());
            responder_id = Some(to_party_id.value.clone());

            // Resolve the governing P-Mode from the collaboration info
            let collaboration_info = &user_message.collaboration_info;
            let candidate_pmode_id = collaboration_info
                .agreement_ref
                .as_ref()
                .and_then(|a| a.pmode.as_deref());

            let resolved = self.pmode_resolver.resolve(
                candidate_pmode_id,
                &collaboration_info.service.value,
                &collaboration_info.action,
                from_party_id.value.as_str(),
                to_party_id.value.as_str(),
                self.server_address.as_deref(),
            )?;
            let Some(resolved) = resolved else {
                error!(
                    "Failed to resolve a P-Mode for id {candidate_pmode_id:?}, service '{}', action '{}'",
                    collaboration_info.service.value, collaboration_info.action
                );
                error_list.push(EbmsErrorCode::ProcessingModeMismatch.as_error(locale));
                return Ok(Outcome::Failure);
            };

            // Two-way bindings need their second leg configured
            if resolved.mep_binding.required_legs() == 2 && resolved.leg2.is_none() {
                error!("P-Mode '{}' does not contain leg 2", resolved.id);
                error_list.push(EbmsErrorCode::ProcessingModeMismatch.as_error(locale));
                return Ok(Outcome::Failure);
            }

            let use_leg1 = Self::use_leg1(user_message);
            let leg_number: u8 = if use_leg1 { 1 } else { 2 };
            let effective_leg = if use_leg1 {
                Some(&resolved.leg1)
            } else {
                resolved.leg2.as_ref()
            };
            let Some(effective_leg) = effective_leg else {
                error!(
                    "P-Mode '{}' does not contain effective leg {leg_number}",
                    resolved.id
                );
                error_list.push(EbmsErrorCode::ProcessingModeMismatch.as_error(locale));
                return Ok(Outcome::Failure);
            };
            state.set_effective_pmode_leg(leg_number, effective_leg.clone());

            if self.check_pmode_mpc(effective_leg, state, error_list).is_failure() {
                return Ok(Outcome::Failure);
            }

            let body_payload_present = Self::soap_body_has_payload(effective_leg, soap_document);
            state.set_soap_body_payload_present(body_payload_present);

            // The P-Mode is usable; now the effective MPC must be known
            let effective_mpc_id = Self::effective_mpc_id(user_message, effective_leg);
            let Some(resolved_mpc) = self.mpc_registry.get_or_default(effective_mpc_id) else {
                error!("Effective MPC id {effective_mpc_id:?} is unknown");
                error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                return Ok(Outcome::Failure);
            };
            effective_mpc = Some(resolved_mpc);
            pmode = Some(resolved);

            let parts = user_message
                .payload_info
                .as_ref()
                .map(|p| p.part_infos.as_slice())
                .unwrap_or(&[]);

            if parts.is_empty() {
                if body_payload_present {
                    error!("No PartInfo is specified, so no SOAP body payload is allowed");
                    error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                    return Ok(Outcome::Failure);
                }
                if !attachments.is_empty() {
                    error!("No PartInfo is specified, so no attachments are allowed");
                    error_list.push(EbmsErrorCode::ExternalPayloadError.as_error(locale));
                    return Ok(Outcome::Failure);
                }
            } else {
                if attachments.len() > parts.len() {
                    error!(
                        "Expected at most {} attachments but got {}",
                        parts.len(),
                        attachments.len()
                    );
                    error_list.push(EbmsErrorCode::ExternalPayloadError.as_error(locale));
                    return Ok(Outcome::Failure);
                }

                let mut specified_attachments = 0usize;

                for part in parts {
                    let href = part.href.as_deref().unwrap_or("");
                    if href.is_empty() {
                        // An href-less part must live in the SOAP body
                        if !body_payload_present {
                            error!("Expected a SOAP body payload but there is none present");
                            error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                            return Ok(Outcome::Failure);
                        }
                        continue;
                    }

                    specified_attachments += 1;

                    let attachment_id = href.strip_prefix(PREFIX_CID).unwrap_or(href);
                    let incoming = attachments.iter().position(|a| a.id() == attachment_id);
                    if incoming.is_none() {
                        // Tolerated here; the decrypt/decompress stage is
                        // authoritative for missing attachments
                        warn!(
                            "Failed to resolve MIME attachment '{attachment_id}' in {:?}",
                            attachments.iter().map(Attachment::id).collect::<Vec<_>>()
                        );
                    }

                    let mut mime_type_present = false;
                    let mut compression_type_present = false;

                    for property in &part.part_properties {
                        let name = property.name.as_str();
                        let value = property.value.as_str();

                        if name.eq_ignore_ascii_case(PART_PROPERTY_MIME_TYPE) {
                            mime_type_present = !value.is_empty();
                        } else if name.eq_ignore_ascii_case(PART_PROPERTY_COMPRESSION_TYPE) {
                            if !value.is_empty() {
                                // AS4 admits no compression type besides gzip
                                let Some(compression_mode) = CompressionMode::from_mime_type(value)
                                else {
                                    error!(
                                        "CompressionType '{value}' of attachment '{attachment_id}' is not supported"
                                    );
                                    error_list
                                        .push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                                    return Ok(Outcome::Failure);
                                };
                                compressed_attachment_ids
                                    .insert(attachment_id.to_string(), compression_mode);
                                compression_type_present = true;
                            }
                        } else if name.eq_ignore_ascii_case(PART_PROPERTY_CHARACTER_SET) {
                            if !value.is_empty() {
                                let Some(charset) = charset_for_label(value) else {
                                    error!(
                                        "CharacterSet '{value}' of attachment '{attachment_id}' is not supported"
                                    );
                                    error_list
                                        .push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                                    return Ok(Outcome::Failure);
                                };
                                if let Some(index) = incoming {
                                    attachments[index].set_charset(charset);
                                }
                            }
                        }
                        // all other property names are ignored
                    }

                    // A compressed part must declare its original MIME type
                    if compression_type_present && !mime_type_present {
                        error!(
                            "MimeType for the compressed attachment '{attachment_id}' is not present"
                        );
                        error_list.push(EbmsErrorCode::ValueInconsistent.as_error(locale));
                        return Ok(Outcome::Failure);
                    }
                }

                // Declared attachment parts and actual MIME attachments must
                // agree in number
                if specified_attachments != attachments.len() {
                    error!(
                        "Expected {} declared attachments but got {}",
                        specified_attachments,
                        attachments.len()
                    );
                    error_list.push(EbmsErrorCode::ExternalPayloadError.as_error(locale));
                    return Ok(Outcome::Failure);
                }
            }
        } else if let Some(signal_message) = messaging.first_signal_message() {
            if let Some(pull_request) = &signal_message.pull_request {
                let known_mpc = pull_request
                    .mpc
                    .as_deref()
                    .and_then(|id| self.mpc_registry.get(id));
                if known_mpc.is_none() {
                    error!("Pull request MPC {:?} is not known", pull_request.mpc);
                    error_list.push(EbmsErrorCode::ValueNotRecognized.as_error(locale));
                    return Ok(Outcome::Failure);
                }

                pmode = self.pull_processors.first_pmode(signal_message)?;
                if pmode.is_none() {
                    error!(
                        "No pull-request processor claimed signal message '{}'",
                        signal_message.message_info.message_id
                    );
                    error_list.push(EbmsErrorCode::ValueNotRecognized.as_error(locale));
                    return Ok(Outcome::Failure);
                }
            } else if signal_message.receipt.is_some() {
                let ref_id = signal_message
                    .message_info
                    .ref_to_message_id
                    .as_deref()
                    .unwrap_or("");
                if ref_id.is_empty() {
                    error!("Receipt signal does not reference the acknowledged message");
                    error_list.push(EbmsErrorCode::InvalidReceipt.as_error(locale));
                    return Ok(Outcome::Failure);
                }
            } else {
                // An incoming error signal is a terminal observation; it is
                // logged but produces no new faults
                for signal_error in &signal_message.errors {
                    if signal_error
                        .ref_to_message_in_error
                        .as_deref()
                        .map_or(true, str::is_empty)
                    {
                        warn!(
                            "Transported error '{}' does not name the message in error",
                            signal_error.error_code
                        );
                    }
                    debug!(
                        "Received transported ebMS error '{}' with severity '{}'",
                        signal_error.error_code, signal_error.severity
                    );
                }
            }
        }

        // Remember in state
        state.set_pmode(pmode);
        state.set_original_soap_document(soap_document.clone());
        state.set_original_attachments(std::mem::take(attachments));
        state.set_compressed_attachment_ids(compressed_attachment_ids);
        state.set_mpc(effective_mpc);
        state.set_initiator_id(initiator_id);
        state.set_responder_id(responder_id);

        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as4gate_protocol::messaging::{
        CollaborationInfo, MessageInfo, Party, PartyId, PartyInfo, Service,
    };

    fn user_message(message_id: &str, ref_id: Option<&str>, mpc: Option<&str>) -> UserMessage {
        let mut info = MessageInfo::new(message_id);
        if let Some(ref_id) = ref_id {
            info = info.with_ref_to_message_id(ref_id);
        }
        UserMessage {
            message_info: info,
            party_info: PartyInfo {
                from: Party {
                    role: "urn:roles:initiator".into(),
                    party_ids: vec![PartyId::new("org:buyer")],
                },
                to: Party {
                    role: "urn:roles:responder".into(),
                    party_ids: vec![PartyId::new("org:seller")],
                },
            },
            collaboration_info: CollaborationInfo {
                agreement_ref: None,
                service: Service {
                    service_type: None,
                    value: "urn:svc".into(),
                },
                action: "Act".into(),
                conversation_id: "conv".into(),
            },
            message_properties: Vec::new(),
            payload_info: None,
            mpc: mpc.map(str::to_string),
        }
    }

    #[test]
    fn test_use_leg1_without_reference() {
        let um = user_message("m-1", None, None);
        assert!(MessagingHeaderProcessor::use_leg1(&um));
    }

    #[test]
    fn test_use_leg1_with_self_reference() {
        // Suspicious but still leg 1
        let um = user_message("m-1", Some("m-1"), None);
        assert!(MessagingHeaderProcessor::use_leg1(&um));
    }

    #[test]
    fn test_use_leg2_with_genuine_reference() {
        let um = user_message("m-2", Some("m-1"), None);
        assert!(!MessagingHeaderProcessor::use_leg1(&um));
    }

    #[test]
    fn test_effective_mpc_precedence() {
        let mut leg = PModeLeg::default();
        leg.business_info.mpc_id = Some("urn:mpc:leg".into());

        let with_own = user_message("m-1", None, Some("urn:mpc:own"));
        assert_eq!(
            MessagingHeaderProcessor::effective_mpc_id(&with_own, &leg),
            Some("urn:mpc:own")
        );

        let without_own = user_message("m-1", None, None);
        assert_eq!(
            MessagingHeaderProcessor::effective_mpc_id(&without_own, &leg),
            Some("urn:mpc:leg")
        );

        let bare = user_message("m-1", None, None);
        assert_eq!(
            MessagingHeaderProcessor::effective_mpc_id(&bare, &PModeLeg::default()),
            None
        );
    }
}
