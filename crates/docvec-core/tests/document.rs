use std::collections::HashMap;

use docvec_core::{content_hash_id, Document, DocvecError};
use serde_json::json;

// ---------------------------------------------------------------------------
// Document ids
// ---------------------------------------------------------------------------

#[test]
fn identical_content_yields_identical_id() {
    let a = Document::new("hello");
    let b = Document::new("hello");
    assert_eq!(a.id(), b.id());
}

#[test]
fn id_ignores_metadata() {
    let plain = Document::new("hello");
    let mut meta = HashMap::new();
    meta.insert("source".to_string(), json!("wiki"));
    let tagged = Document::with_metadata("hello", meta);
    assert_eq!(plain.id(), tagged.id());
}

#[test]
fn different_content_yields_different_id() {
    assert_ne!(Document::new("hello").id(), Document::new("world").id());
}

#[test]
fn id_is_a_uuid() {
    let id = Document::new("hello").id();
    assert_eq!(id.len(), 36);
    assert_eq!(id, content_hash_id("hello"));
    assert!(uuid::Uuid::parse_str(&id).is_ok());
}

// ---------------------------------------------------------------------------
// Payload schema
// ---------------------------------------------------------------------------

#[test]
fn payload_contains_content_and_metadata() {
    let mut meta = HashMap::new();
    meta.insert("page".to_string(), json!(7));
    let doc = Document::with_metadata("body", meta);

    let payload = doc.to_payload().unwrap();
    assert_eq!(payload.get("content"), Some(&json!("body")));
    assert_eq!(payload.get("metadata"), Some(&json!({"page": 7})));
}

#[test]
fn payload_without_metadata_decodes() {
    let payload = json!({"content": "only text"});
    let doc = Document::from_payload(payload.as_object().cloned().unwrap()).unwrap();
    assert_eq!(doc.content, "only text");
    assert!(doc.metadata.is_empty());
}

#[test]
fn payload_restores_document() {
    let mut meta = HashMap::new();
    meta.insert("tags".to_string(), json!(["a", "b"]));
    let doc = Document::with_metadata("text", meta);

    let back = Document::from_payload(doc.to_payload().unwrap()).unwrap();
    assert_eq!(back, doc);
}

#[test]
fn payload_with_unknown_field_is_rejected() {
    let payload = json!({"content": "x", "score": 0.3});
    let err = Document::from_payload(payload.as_object().cloned().unwrap()).unwrap_err();
    assert!(matches!(err, DocvecError::Parsing(_)));
}

#[test]
fn payload_missing_content_is_rejected() {
    let payload = json!({"metadata": {}});
    let err = Document::from_payload(payload.as_object().cloned().unwrap()).unwrap_err();
    assert!(matches!(err, DocvecError::Parsing(_)));
}

#[test]
fn error_messages_carry_prefix() {
    let err = DocvecError::Config("no collection set".into());
    assert_eq!(err.to_string(), "config error: no collection set");
}
