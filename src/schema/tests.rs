//! Schema tests

use super::*;
use crate::error::Error;
use serde_json::json;

#[test]
fn test_every_embedded_schema_parses() {
    for (name, _) in SCHEMA_FILES {
        let schema = load_schema(name).unwrap();
        assert_eq!(schema.json_type, JsonType::Object, "schema {name}");
        assert!(schema.has_property("id"), "schema {name} lacks id");
        assert!(schema.is_required("id"), "schema {name} does not require id");
        assert_eq!(schema.title.as_deref(), Some(*name));
    }
}

#[test]
fn test_unknown_schema_name() {
    let err = load_schema("invoice").unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("invoice"));
}

#[test]
fn test_nullable_types_parse() {
    let schema = load_schema("ad").unwrap();
    let start = schema.get_property("startDate").unwrap();

    assert!(start.is_nullable());
    assert_eq!(start.primary_type(), Some(JsonType::String));
    assert_eq!(start.format.as_deref(), Some("date-time"));
}

#[test]
fn test_nested_object_schema() {
    let schema = load_schema("campaign").unwrap();
    let spend_limit = schema.get_property("spendLimit").unwrap();

    assert_eq!(spend_limit.primary_type(), Some(JsonType::Object));
    let nested = spend_limit.properties.as_ref().unwrap();
    assert!(nested.contains_key("spendLimitAmount"));
}

#[test]
fn test_schema_builder_to_json() {
    let schema = JsonSchema::new()
        .with_property("Clicks", SchemaProperty::new(JsonType::Integer))
        .with_property("Day", SchemaProperty::date())
        .with_property("Hour", SchemaProperty::date_time());

    assert_eq!(
        schema.to_json(),
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "Clicks": {"type": "integer"},
                "Day": {"type": "string", "format": "date"},
                "Hour": {"type": "string", "format": "date-time"}
            },
            "additionalProperties": true
        })
    );
}

#[test]
fn test_required_is_deduplicated() {
    let mut schema = JsonSchema::new();
    schema.add_required("id");
    schema.add_required("id");
    assert_eq!(schema.required, vec!["id".to_string()]);
}

#[test]
fn test_json_type_display() {
    assert_eq!(JsonType::Integer.to_string(), "integer");
    assert_eq!(JsonType::Null.to_string(), "null");
}
