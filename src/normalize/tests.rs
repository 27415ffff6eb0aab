//! Tests for record normalization

use super::*;
use crate::types::Record;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

// ============================================================================
// Flattening
// ============================================================================

#[test]
fn test_flatten_attributes() {
    let raw = record(json!({"id": "9", "attributes": {"name": "Acme"}}));

    let out = Normalizer::Flatten.normalize("campaigns", raw);
    assert_eq!(out, Normalized::Emit(record(json!({"id": "9", "name": "Acme"}))));
}

#[test]
fn test_flatten_attribute_keys_overwrite_top_level() {
    let raw = record(json!({
        "id": "9",
        "type": "Campaign",
        "attributes": {"type": "Retargeting", "name": "Spring"}
    }));

    let out = Normalizer::Flatten
        .normalize("campaigns", raw)
        .into_record()
        .unwrap();

    assert_eq!(out["type"], "Retargeting");
    assert_eq!(out["id"], "9");
    assert!(!out.contains_key("attributes"));
}

#[test]
fn test_flatten_leaves_non_object_attributes() {
    let raw = record(json!({"id": "1", "attributes": "opaque"}));

    let out = Normalizer::Flatten.normalize("ads", raw.clone());
    assert_eq!(out, Normalized::Emit(raw));
}

#[test]
fn test_flatten_without_attributes_is_noop() {
    let raw = record(json!({"id": "1", "name": "already flat"}));

    let out = Normalizer::Flatten.normalize("ads", raw.clone());
    assert_eq!(out, Normalized::Emit(raw));
}

#[test]
fn test_passthrough_keeps_attributes() {
    let raw = record(json!({"id": "1", "attributes": {"name": "x"}}));
    assert_eq!(
        Normalizer::Passthrough.normalize("any", raw.clone()),
        Normalized::Emit(raw)
    );
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_scoping_suppresses_unlisted_advertiser() {
    let normalizer = Normalizer::scoped(["1", "2"]);

    let out = normalizer.normalize("advertisers", record(json!({"id": "3"})));
    assert!(out.is_suppressed());
}

#[test]
fn test_scoping_keeps_listed_advertiser_flattened() {
    let normalizer = Normalizer::scoped(["1", "2"]);
    let raw = record(json!({"id": "1", "attributes": {"advertiserName": "Acme"}}));

    let out = normalizer.normalize("advertisers", raw);
    assert_eq!(
        out,
        Normalized::Emit(record(json!({"id": "1", "advertiserName": "Acme"})))
    );
}

#[test]
fn test_scoping_stringifies_numeric_ids() {
    let normalizer = Normalizer::scoped(["42"]);

    let out = normalizer.normalize("advertisers", record(json!({"id": 42})));
    assert!(!out.is_suppressed());
}

#[test]
fn test_scoping_drops_records_without_id() {
    let normalizer = Normalizer::scoped(["1"]);

    let out = normalizer.normalize("advertisers", record(json!({"name": "no id"})));
    assert!(out.is_suppressed());
}

#[test]
fn test_empty_allow_list_keeps_everything() {
    let normalizer = Normalizer::scoped(Vec::<String>::new());

    let out = normalizer.normalize("advertisers", record(json!({"id": "3"})));
    assert_eq!(out.into_record(), Some(record(json!({"id": "3"}))));
}

// ============================================================================
// Coercion
// ============================================================================

#[test]
fn test_report_row_coercion() {
    let normalizer = Normalizer::Coerce(CoercionTable::report_defaults());
    let raw = record(json!({"Clicks": "42", "Hour": "01/02/2024 03:00:00"}));

    let out = normalizer.normalize("daily", raw);
    assert_eq!(
        out,
        Normalized::Emit(record(json!({
            "Clicks": 42,
            "Hour": "2024-01-02T03:00:00+00:00"
        })))
    );
}

#[test]
fn test_unknown_fields_pass_through() {
    let normalizer = Normalizer::Coerce(CoercionTable::report_defaults());
    let raw = record(json!({"AdvertiserId": "12", "Currency": "EUR", "Device": "Mobile"}));

    let out = normalizer.normalize("daily", raw.clone());
    assert_eq!(out, Normalized::Emit(raw));
}

#[test]
fn test_failed_coercion_is_lenient() {
    let normalizer = Normalizer::Coerce(CoercionTable::report_defaults());
    let raw = record(json!({"Clicks": "n/a", "Day": "yesterday", "Visits": "3"}));

    let out = normalizer.normalize("daily", raw).into_record().unwrap();
    assert_eq!(out["Clicks"], "n/a");
    assert_eq!(out["Day"], "yesterday");
    assert_eq!(out["Visits"], 3);
}

#[test]
fn test_normalizing_twice_is_noop() {
    let normalizers = [
        Normalizer::Flatten,
        Normalizer::scoped(["1"]),
        Normalizer::Coerce(CoercionTable::report_defaults()),
    ];
    let raw = record(json!({
        "id": "1",
        "attributes": {"name": "Acme"},
        "Clicks": "42",
        "Displays": 1000.0,
        "AdvertiserCost": "12.5",
        "Hour": "01/02/2024 03:00:00",
        "Day": "01/02/2024"
    }));

    for normalizer in normalizers {
        let once = normalizer
            .normalize("s", raw.clone())
            .into_record()
            .unwrap();
        let twice = normalizer
            .normalize("s", once.clone())
            .into_record()
            .unwrap();
        assert_eq!(once, twice, "{normalizer:?}");
    }
}

#[test_case(Coercion::Integer, json!("42"), json!(42) ; "integer from string")]
#[test_case(Coercion::Integer, json!(" 7 "), json!(7) ; "integer from padded string")]
#[test_case(Coercion::Integer, json!(1000.0), json!(1000) ; "integer from integral float")]
#[test_case(Coercion::Integer, json!("1000.0"), json!(1000) ; "integer from float string")]
#[test_case(Coercion::Integer, json!(5), json!(5) ; "integer unchanged")]
#[test_case(Coercion::Number, json!("12.5"), json!(12.5) ; "number from string")]
#[test_case(Coercion::Number, json!("3"), json!(3) ; "number from integral string")]
#[test_case(Coercion::Number, json!(0.25), json!(0.25) ; "number unchanged")]
#[test_case(Coercion::Date, json!("01/02/2024"), json!("2024-01-02") ; "date from us format")]
#[test_case(Coercion::Date, json!("2024-01-02"), json!("2024-01-02") ; "date unchanged")]
#[test_case(Coercion::Date, json!("2024-01-02T10:00:00Z"), json!("2024-01-02") ; "date from timestamp")]
#[test_case(Coercion::DateTime, json!("01/02/2024 03:00:00"), json!("2024-01-02T03:00:00+00:00") ; "hour from us format")]
#[test_case(Coercion::DateTime, json!("2024-01-02T03:00:00"), json!("2024-01-02T03:00:00+00:00") ; "hour from naive iso")]
#[test_case(Coercion::DateTime, json!("2024-01-02T05:00:00+02:00"), json!("2024-01-02T03:00:00+00:00") ; "hour from offset")]
#[test_case(Coercion::DateTime, json!(null), json!(null) ; "null passes through")]
fn test_coercion(coercion: Coercion, input: Value, expected: Value) {
    assert_eq!(coercion.apply("field", &input).unwrap(), expected);
}

#[test_case(Coercion::Integer, json!("12.5") ; "fractional integer")]
#[test_case(Coercion::Integer, json!(true) ; "boolean integer")]
#[test_case(Coercion::Number, json!("abc") ; "text number")]
#[test_case(Coercion::Date, json!("13/45/2024") ; "impossible date")]
#[test_case(Coercion::DateTime, json!(1_704_164_400) ; "numeric timestamp")]
fn test_coercion_failure(coercion: Coercion, input: Value) {
    let err = coercion.apply("Clicks", &input).unwrap_err();
    assert!(err.to_string().contains("Clicks"));
}

#[test]
fn test_coercion_table() {
    let table = CoercionTable::report_defaults();
    assert_eq!(table.get("Clicks"), Some(Coercion::Integer));
    assert_eq!(table.get("Hour"), Some(Coercion::DateTime));
    assert_eq!(table.get("Week"), Some(Coercion::Date));
    assert_eq!(table.get("Currency"), None);
    assert_eq!(table.len(), 9);

    let custom = CoercionTable::new().with("Sales", Coercion::Number);
    assert_eq!(custom.get("Sales"), Some(Coercion::Number));
    assert!(CoercionTable::new().is_empty());
}
