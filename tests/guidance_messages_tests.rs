use sipbrain_cockpit::channel::{CardKind, GuidanceMessage};

#[test]
fn test_objection_deserialization() {
    let json = r#"{
        "type": "objection",
        "id": "c1",
        "title": "Price Concern",
        "content": "Offer SIP top-up"
    }"#;

    let msg: GuidanceMessage = serde_json::from_str(json).unwrap();
    let (kind, payload) = msg.into_card().expect("objection is a card");
    assert_eq!(kind, CardKind::Objection);
    assert_eq!(payload.id, "c1");
    assert_eq!(payload.title, "Price Concern");
    assert_eq!(payload.content, "Offer SIP top-up");
    assert!(payload.data.is_none());
}

#[test]
fn test_fact_with_table() {
    let json = r#"{
        "id": "4821",
        "type": "fact",
        "title": "FD vs Mutual Fund",
        "content": "FDs are taxed. MFs are efficient.",
        "data": {"table": {"FD Post-Tax": "4.8%", "Hybrid": "11.2%"}}
    }"#;

    let msg: GuidanceMessage = serde_json::from_str(json).unwrap();
    let (kind, payload) = msg.into_card().unwrap();
    assert_eq!(kind, CardKind::Fact);

    let table = payload.data.unwrap().table.unwrap();
    let labels: Vec<&String> = table.keys().collect();
    assert_eq!(labels, vec!["FD Post-Tax", "Hybrid"]);
    assert_eq!(table["Hybrid"], "11.2%");
}

#[test]
fn test_numeric_id_and_null_content() {
    let json = r#"{"type": "objection", "id": 1234, "title": "Risk", "content": null}"#;

    let msg: GuidanceMessage = serde_json::from_str(json).unwrap();
    let (_, payload) = msg.into_card().unwrap();
    assert_eq!(payload.id, "1234");
    assert!(payload.content.is_empty());
}

#[test]
fn test_missing_fields_default_to_empty() {
    let msg: GuidanceMessage = serde_json::from_str(r#"{"type": "fact"}"#).unwrap();

    let (_, payload) = msg.into_card().unwrap();
    assert!(payload.id.is_empty());
    assert!(payload.title.is_empty());
    assert!(payload.content.is_empty());
}

#[test]
fn test_unknown_types_are_not_cards() {
    for json in [
        r#"{"type": "none", "title": "", "content": ""}"#,
        r#"{"type": "sentiment", "score": 0.4}"#,
    ] {
        let msg: GuidanceMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg, GuidanceMessage::Other);
        assert!(msg.into_card().is_none());
    }
}

#[test]
fn test_message_without_type_is_rejected() {
    let result = serde_json::from_str::<GuidanceMessage>(r#"{"title": "No type"}"#);
    assert!(result.is_err());
}
