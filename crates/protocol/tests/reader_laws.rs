//! Messaging reader laws over generated headers

use as4gate_protocol::reader::MessagingReader;
use as4gate_protocol::soap::{QName, XmlElement};
use proptest::prelude::*;

fn text_el(local: &str, text: &str) -> XmlElement {
    XmlElement::new(QName::ebms(local)).with_text(text)
}

fn user_message_el(
    message_id: &str,
    ref_to_message_id: Option<&str>,
    mpc: Option<&str>,
    service: &str,
    action: &str,
) -> XmlElement {
    let mut info = XmlElement::new(QName::ebms("MessageInfo"))
        .with_child(text_el("Timestamp", "2024-05-01T12:00:00Z"))
        .with_child(text_el("MessageId", message_id));
    if let Some(ref_id) = ref_to_message_id {
        info = info.with_child(text_el("RefToMessageId", ref_id));
    }

    let mut user_message = XmlElement::new(QName::ebms("UserMessage"))
        .with_child(info)
        .with_child(
            XmlElement::new(QName::ebms("PartyInfo"))
                .with_child(
                    XmlElement::new(QName::ebms("From"))
                        .with_child(text_el("PartyId", "org:initiator"))
                        .with_child(text_el("Role", "urn:roles:initiator")),
                )
                .with_child(
                    XmlElement::new(QName::ebms("To"))
                        .with_child(text_el("PartyId", "org:responder"))
                        .with_child(text_el("Role", "urn:roles:responder")),
                ),
        )
        .with_child(
            XmlElement::new(QName::ebms("CollaborationInfo"))
                .with_child(text_el("Service", service))
                .with_child(text_el("Action", action))
                .with_child(text_el("ConversationId", "conv-1")),
        );
    if let Some(mpc) = mpc {
        user_message = user_message.with_attribute("mpc", mpc);
    }
    user_message
}

// Strategy for plausible ebMS identifier strings
fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.-]{0,24}@[a-z][a-z0-9]{0,11}"
}

fn token_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9:._-]{0,30}"
}

proptest! {
    // A structurally complete user message always parses, without
    // diagnostics, and every field survives the trip into the typed tree.
    #[test]
    fn prop_well_formed_user_message_parses(
        message_id in id_strategy(),
        ref_id in proptest::option::of(id_strategy()),
        mpc in proptest::option::of(token_strategy()),
        service in token_strategy(),
        action in token_strategy(),
    ) {
        let header = XmlElement::new(QName::ebms("Messaging")).with_child(user_message_el(
            &message_id,
            ref_id.as_deref(),
            mpc.as_deref(),
            &service,
            &action,
        ));

        let mut diagnostics = Vec::new();
        let messaging = MessagingReader::new().read(&header, &mut diagnostics);

        prop_assert!(diagnostics.is_empty(), "diagnostics: {diagnostics:?}");
        let messaging = messaging.expect("well-formed header must parse");
        prop_assert_eq!(messaging.user_message_count(), 1);
        prop_assert_eq!(messaging.signal_message_count(), 0);

        let um = messaging.first_user_message().unwrap();
        prop_assert_eq!(&um.message_info.message_id, &message_id);
        prop_assert_eq!(um.message_info.ref_to_message_id.as_deref(), ref_id.as_deref());
        prop_assert_eq!(um.mpc.as_deref(), mpc.as_deref());
        prop_assert_eq!(&um.collaboration_info.service.value, &service);
        prop_assert_eq!(&um.collaboration_info.action, &action);
    }

    // Reading is deterministic: the same tree yields the same result and the
    // same diagnostics, run after run.
    #[test]
    fn prop_reader_is_deterministic(
        message_id in id_strategy(),
        ref_id in proptest::option::of(id_strategy()),
    ) {
        let header = XmlElement::new(QName::ebms("Messaging")).with_child(user_message_el(
            &message_id,
            ref_id.as_deref(),
            None,
            "urn:example:order",
            "Submit",
        ));

        let mut first_diags = Vec::new();
        let first = MessagingReader::new().read(&header, &mut first_diags);
        let mut second_diags = Vec::new();
        let second = MessagingReader::new().read(&header, &mut second_diags);

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_diags, second_diags);
    }
}

#[test]
fn reader_rejects_header_missing_party_info() {
    let user_message = XmlElement::new(QName::ebms("UserMessage"))
        .with_child(
            XmlElement::new(QName::ebms("MessageInfo"))
                .with_child(text_el("Timestamp", "2024-05-01T12:00:00Z"))
                .with_child(text_el("MessageId", "msg-1")),
        )
        .with_child(
            XmlElement::new(QName::ebms("CollaborationInfo"))
                .with_child(text_el("Service", "urn:example:order"))
                .with_child(text_el("Action", "Submit"))
                .with_child(text_el("ConversationId", "conv-1")),
        );
    let header = XmlElement::new(QName::ebms("Messaging")).with_child(user_message);

    let mut diagnostics = Vec::new();
    assert!(MessagingReader::new().read(&header, &mut diagnostics).is_none());
    assert!(diagnostics.iter().any(|d| d.message.contains("PartyInfo")));
}
