//! Reader turning a parsed `Messaging` SOAP header element into the typed
//! object tree
//!
//! The reader enforces the schema-derived structure rules (required children,
//! required attributes, timestamp syntax) and collects everything it finds
//! wrong into a diagnostics side channel. It yields `None` exactly when an
//! error-severity diagnostic was recorded; unknown elements only produce
//! warnings and do not block reading.

use crate::messaging::{
    AgreementRef, CollaborationInfo, MessageInfo, Messaging, Party, PartyId, PartInfo, PartyInfo,
    PayloadInfo, Property, PullRequest, Receipt, Service, SignalError, SignalMessage, UserMessage,
};
use crate::soap::XmlElement;
use crate::EBMS_NS;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Severity of a reader diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Tolerated deviation, reading continues
    Warning,
    /// Schema violation, the header is unusable
    Error,
}

/// One finding collected while reading a `Messaging` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the finding
    pub severity: DiagnosticSeverity,
    /// Element path the finding refers to
    pub location: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            location: location.into(),
            message: message.into(),
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Error)
        .count()
}

/// Reader for ebMS `Messaging` header elements
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagingReader;

impl MessagingReader {
    /// Create a reader
    pub fn new() -> Self {
        Self
    }

    /// Read a `Messaging` element into the typed tree
    ///
    /// Findings are appended to `diagnostics`. Returns `None` when any
    /// error-severity finding was recorded during this call.
    pub fn read(
        &self,
        element: &XmlElement,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Messaging> {
        let initial_errors = error_count(diagnostics);

        if element.name.local_name != "Messaging" || element.name.namespace_uri != EBMS_NS {
            diagnostics.push(Diagnostic::error(
                "Messaging",
                format!("Expected an ebMS Messaging element, got '{}'", element.name),
            ));
            return None;
        }

        let mut messaging = Messaging::default();
        for child in element.child_elements() {
            match child.name.local_name.as_str() {
                "UserMessage" => {
                    if let Some(user_message) = read_user_message(child, diagnostics) {
                        messaging.user_messages.push(user_message);
                    }
                }
                "SignalMessage" => {
                    if let Some(signal_message) = read_signal_message(child, diagnostics) {
                        messaging.signal_messages.push(signal_message);
                    }
                }
                other => {
                    diagnostics.push(Diagnostic::warning(
                        "Messaging",
                        format!("Ignoring unknown element '{other}'"),
                    ));
                }
            }
        }

        if error_count(diagnostics) > initial_errors {
            None
        } else {
            Some(messaging)
        }
    }
}

fn require_child<'a>(
    parent: &'a XmlElement,
    local_name: &str,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<&'a XmlElement> {
    let child = parent.first_child_element(local_name);
    if child.is_none() {
        diagnostics.push(Diagnostic::error(
            location,
            format!("Required element '{local_name}' is missing"),
        ));
    }
    child
}

fn require_text(
    element: &XmlElement,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<String> {
    let text = element.text();
    if text.trim().is_empty() {
        diagnostics.push(Diagnostic::error(
            location,
            "Element must carry a non-empty value",
        ));
        return None;
    }
    Some(text)
}

fn optional_text(element: Option<&XmlElement>) -> Option<String> {
    element.map(|e| e.text()).filter(|t| !t.is_empty())
}

/// Parse an `xs:dateTime`; offset-free values are taken as UTC
fn parse_timestamp(
    value: &str,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    diagnostics.push(Diagnostic::error(
        location,
        format!("'{value}' is not a valid timestamp"),
    ));
    None
}

fn read_message_info(
    parent: &XmlElement,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<MessageInfo> {
    let info_location = format!("{location}/MessageInfo");
    let element = require_child(parent, "MessageInfo", location, diagnostics)?;

    let message_id = require_child(element, "MessageId", &info_location, diagnostics)
        .and_then(|e| require_text(e, &format!("{info_location}/MessageId"), diagnostics));
    let timestamp = require_child(element, "Timestamp", &info_location, diagnostics)
        .and_then(|e| require_text(e, &format!("{info_location}/Timestamp"), diagnostics))
        .and_then(|t| parse_timestamp(&t, &format!("{info_location}/Timestamp"), diagnostics));
    let ref_to_message_id = optional_text(element.first_child_element("RefToMessageId"));

    Some(MessageInfo {
        message_id: message_id?,
        ref_to_message_id,
        timestamp: timestamp?,
    })
}

fn read_party(
    parent: &XmlElement,
    local_name: &str,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Party> {
    let party_location = format!("{location}/{local_name}");
    let element = require_child(parent, local_name, location, diagnostics)?;

    let role = require_child(element, "Role", &party_location, diagnostics)
        .and_then(|e| require_text(e, &format!("{party_location}/Role"), diagnostics));

    let mut party_ids = Vec::new();
    for party_id in element.child_elements_named("PartyId") {
        let value =
            require_text(party_id, &format!("{party_location}/PartyId"), diagnostics)?;
        party_ids.push(PartyId {
            id_type: party_id.attribute("type").map(str::to_string),
            value,
        });
    }
    if party_ids.is_empty() {
        diagnostics.push(Diagnostic::error(
            &party_location,
            "At least one PartyId is required",
        ));
        return None;
    }

    Some(Party {
        role: role?,
        party_ids,
    })
}

fn read_collaboration_info(
    parent: &XmlElement,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<CollaborationInfo> {
    let info_location = format!("{location}/CollaborationInfo");
    let element = require_child(parent, "CollaborationInfo", location, diagnostics)?;

    let agreement_ref = element.first_child_element("AgreementRef").map(|e| AgreementRef {
        value: e.text(),
        pmode: e.attribute("pmode").map(str::to_string),
    });

    let service = require_child(element, "Service", &info_location, diagnostics).and_then(|e| {
        let value = require_text(e, &format!("{info_location}/Service"), diagnostics)?;
        Some(Service {
            service_type: e.attribute("type").map(str::to_string),
            value,
        })
    });
    let action = require_child(element, "Action", &info_location, diagnostics)
        .and_then(|e| require_text(e, &format!("{info_location}/Action"), diagnostics));
    let conversation_id = require_child(element, "ConversationId", &info_location, diagnostics)
        .map(|e| e.text());

    Some(CollaborationInfo {
        agreement_ref,
        service: service?,
        action: action?,
        conversation_id: conversation_id?,
    })
}

fn read_properties(
    element: &XmlElement,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Property> {
    let mut properties = Vec::new();
    for property in element.child_elements_named("Property") {
        match property.attribute("name") {
            Some(name) if !name.is_empty() => {
                properties.push(Property::new(name, property.text()));
            }
            _ => diagnostics.push(Diagnostic::error(
                location,
                "Property without a 'name' attribute",
            )),
        }
    }
    properties
}

fn read_payload_info(
    element: &XmlElement,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> PayloadInfo {
    let mut payload_info = PayloadInfo::default();
    for part in element.child_elements_named("PartInfo") {
        let part_properties = part
            .first_child_element("PartProperties")
            .map(|props| {
                read_properties(props, &format!("{location}/PartInfo/PartProperties"), diagnostics)
            })
            .unwrap_or_default();
        payload_info.part_infos.push(PartInfo {
            href: part.attribute("href").map(str::to_string),
            part_properties,
        });
    }
    payload_info
}

fn read_user_message(
    element: &XmlElement,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<UserMessage> {
    let location = "Messaging/UserMessage";

    let message_info = read_message_info(element, location, diagnostics);

    let party_info = require_child(element, "PartyInfo", location, diagnostics).and_then(|e| {
        let party_location = format!("{location}/PartyInfo");
        let from = read_party(e, "From", &party_location, diagnostics);
        let to = read_party(e, "To", &party_location, diagnostics);
        Some(PartyInfo {
            from: from?,
            to: to?,
        })
    });

    let collaboration_info = read_collaboration_info(element, location, diagnostics);

    let message_properties = element
        .first_child_element("MessageProperties")
        .map(|e| read_properties(e, &format!("{location}/MessageProperties"), diagnostics))
        .unwrap_or_default();

    let payload_info = element
        .first_child_element("PayloadInfo")
        .map(|e| read_payload_info(e, &format!("{location}/PayloadInfo"), diagnostics));

    Some(UserMessage {
        message_info: message_info?,
        party_info: party_info?,
        collaboration_info: collaboration_info?,
        message_properties,
        payload_info,
        mpc: element.attribute("mpc").map(str::to_string),
    })
}

fn read_signal_error(element: &XmlElement, diagnostics: &mut Vec<Diagnostic>) -> Option<SignalError> {
    let location = "Messaging/SignalMessage/Error";

    let error_code = element.attribute("errorCode").map(str::to_string);
    if error_code.is_none() {
        diagnostics.push(Diagnostic::error(
            location,
            "Required attribute 'errorCode' is missing",
        ));
    }
    let severity = element.attribute("severity").map(str::to_string);
    if severity.is_none() {
        diagnostics.push(Diagnostic::error(
            location,
            "Required attribute 'severity' is missing",
        ));
    }

    Some(SignalError {
        error_code: error_code?,
        severity: severity?,
        category: element.attribute("category").map(str::to_string),
        ref_to_message_in_error: element.attribute("refToMessageInError").map(str::to_string),
        short_description: element.attribute("shortDescription").map(str::to_string),
        description: optional_text(element.first_child_element("Description")),
        error_detail: optional_text(element.first_child_element("ErrorDetail")),
    })
}

fn read_signal_message(
    element: &XmlElement,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<SignalMessage> {
    let location = "Messaging/SignalMessage";

    let message_info = read_message_info(element, location, diagnostics);

    let pull_request = element.first_child_element("PullRequest").map(|e| PullRequest {
        mpc: e.attribute("mpc").map(str::to_string),
    });

    let receipt = element.first_child_element("Receipt").map(|e| Receipt {
        content: e.child_elements().cloned().collect(),
    });

    let mut errors = Vec::new();
    for error in element.child_elements_named("Error") {
        if let Some(signal_error) = read_signal_error(error, diagnostics) {
            errors.push(signal_error);
        }
    }

    if pull_request.is_none() && receipt.is_none() && errors.is_empty() {
        diagnostics.push(Diagnostic::warning(
            location,
            "Signal message carries neither PullRequest, Receipt nor Error",
        ));
    }

    Some(SignalMessage {
        message_info: message_info?,
        pull_request,
        receipt,
        errors,
    })
}
