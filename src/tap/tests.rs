//! Tests for tap orchestration

use super::*;
use crate::config::{ReportConfig, TapConfig};
use crate::engine::{Message, SyncConfig};
use crate::error::Error;
use crate::output::CollectingSink;
use crate::stream::STATIC_STREAM_NAMES;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer, advertiser_ids: &[&str]) -> TapConfig {
    TapConfig::from_value(&json!({
        "client_id": "client",
        "client_secret": "secret",
        "advertiser_ids": advertiser_ids,
        "start_date": "2024-01-01",
        "api_url": server.uri(),
        "auth_url": format!("{}/oauth2/token", server.uri()),
        "requests_per_second": 1000,
        "max_retries": 0
    }))
    .unwrap()
}

fn offline_config(reports: Value) -> TapConfig {
    TapConfig::from_value(&json!({
        "client_id": "client",
        "client_secret": "secret",
        "advertiser_ids": [],
        "start_date": "2024-01-01",
        "reports": reports
    }))
    .unwrap()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token",
            "expires_in": 900
        })))
        .mount(server)
        .await;
}

async fn mount_json(server: &MockServer, http_method: &str, route: &str, body: Value) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_advertisers(server: &MockServer) {
    mount_json(
        server,
        "GET",
        "/2026-01/advertisers/me",
        json!({"data": [
            {"id": "1", "type": "Advertiser", "attributes": {"advertiserName": "Acme"}},
            {"id": "2", "type": "Advertiser", "attributes": {"advertiserName": "Globex"}}
        ]}),
    )
    .await;
}

fn kinds(sink: &CollectingSink, stream: &str) -> Vec<&'static str> {
    sink.messages()
        .iter()
        .filter(|m| m.stream() == stream)
        .map(|m| match m {
            Message::Schema { .. } => "SCHEMA",
            Message::Record { .. } => "RECORD",
            Message::StreamEnd { .. } => "STREAM_END",
        })
        .collect()
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discover_static_then_reports() {
    let config = offline_config(json!([
        {"name": "daily", "dimensions": ["Day"], "metrics": ["Clicks"]},
        {"name": "by_device", "dimensions": ["Device"], "metrics": ["Displays"]}
    ]));

    let streams = discover_streams(&config).unwrap();
    let names: Vec<_> = streams.iter().map(|s| s.name()).collect();

    let mut expected = STATIC_STREAM_NAMES.to_vec();
    expected.extend(["daily", "by_device"]);
    assert_eq!(names, expected);
    assert!(streams[6].is_report());
}

#[test]
fn test_discover_rejects_report_named_like_static_stream() {
    let config = offline_config(json!([
        {"name": "ads", "dimensions": ["Day"], "metrics": ["Clicks"]}
    ]));

    let err = discover_streams(&config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
    assert!(err.to_string().contains("ads"));
}

#[test]
fn test_discover_rejects_unknown_report_field() {
    let mut config = offline_config(json!([]));
    config.reports.push(ReportConfig::new(
        "broken",
        strings(&["Day", "Bogus"]),
        strings(&["Clicks"]),
    ));

    let err = discover_streams(&config).unwrap_err();
    assert!(err.is_fatal_for_run());
    assert!(err.to_string().contains("Bogus"));
}

#[test]
fn test_catalog_lists_every_stream() {
    let config = offline_config(json!([
        {"name": "daily", "dimensions": ["Day"], "metrics": ["Clicks"]}
    ]));
    let tap = Tap::new(&config).unwrap();
    let catalog = tap.catalog();

    let streams = catalog["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 7);

    let ads = &streams[4];
    assert_eq!(ads["stream"], "ads");
    assert_eq!(ads["parent"], "advertisers");
    assert_eq!(ads["key_properties"], json!(["id"]));
    assert_eq!(ads["kind"], "static");

    let daily = &streams[6];
    assert_eq!(daily["kind"], "report");
    assert_eq!(daily["key_properties"], json!(["Day"]));
    assert!(daily["schema"]["properties"]["Currency"].is_object());
}

// ============================================================================
// Check
// ============================================================================

#[tokio::test]
async fn test_check_succeeds() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_advertisers(&server).await;

    let tap = Tap::new(&config(&server, &[])).unwrap();
    assert_eq!(tap.check().await, CheckResult::success());
}

#[tokio::test]
async fn test_check_reports_token_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
        .mount(&server)
        .await;

    let tap = Tap::new(&config(&server, &[])).unwrap();
    let result = tap.check().await;

    assert!(!result.success);
    assert!(result.message.unwrap().contains("401"));
}

// ============================================================================
// Sync
// ============================================================================

#[tokio::test]
async fn test_sync_all_streams() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_advertisers(&server).await;

    Mock::given(method("POST"))
        .and(path("/2026-01/marketing-solutions/audiences/search"))
        .and(body_json(json!({
            "data": {"type": "AudienceSearchEntity", "attributes": {"advertiserIds": ["1"]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"id": "a1", "type": "Audience", "attributes": {"name": "Visitors"}}
        ]})))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "POST",
        "/2026-01/marketing-solutions/campaigns/search",
        json!({"data": [{"id": "c1", "attributes": {"name": "Spring"}}]}),
    )
    .await;
    mount_json(
        &server,
        "POST",
        "/2026-01/marketing-solutions/ad-sets/search",
        json!({"data": []}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/2026-01/marketing-solutions/advertisers/1/ads"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"id": "ad1", "attributes": {"name": "Banner"}}
        ]})))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(
        &server,
        "GET",
        "/2026-01/marketing-solutions/advertisers/1/creatives",
        json!({"data": []}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/2026-01/marketing-solutions/advertisers/2/ads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let mut tap = Tap::new(&config(&server, &["1"])).unwrap();
    let mut sink = CollectingSink::new();
    let report = tap.sync(&[], &mut sink).await.unwrap();

    assert_eq!(report.status(), SyncStatus::Succeeded);
    assert_eq!(sink.streams(), STATIC_STREAM_NAMES.to_vec());
    assert_eq!(report.get("advertisers").unwrap().records, 1);
    assert_eq!(report.get("ads").unwrap().records, 1);
    assert_eq!(report.get("creatives").unwrap().records, 0);
    assert_eq!(report.total_records(), 4);

    assert_eq!(kinds(&sink, "ads"), vec!["SCHEMA", "RECORD", "STREAM_END"]);
    assert_eq!(kinds(&sink, "ad_sets"), vec!["SCHEMA", "STREAM_END"]);

    let advertisers = sink.records("advertisers");
    let Message::Record { record, .. } = advertisers[0] else {
        panic!("expected a record");
    };
    assert_eq!(
        Value::Object(record.clone()),
        json!({"id": "1", "type": "Advertiser", "advertiserName": "Acme"})
    );
}

#[tokio::test]
async fn test_sync_unselected_parent_runs_silently() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_advertisers(&server).await;

    for id in ["1", "2"] {
        mount_json(
            &server,
            "GET",
            &format!("/2026-01/marketing-solutions/advertisers/{id}/ads"),
            json!({"data": [{"id": format!("ad-{id}")}]}),
        )
        .await;
    }

    let mut tap = Tap::new(&config(&server, &[])).unwrap();
    let mut sink = CollectingSink::new();
    let report = tap.sync(&strings(&["ads"]), &mut sink).await.unwrap();

    assert_eq!(sink.streams(), vec!["ads"]);
    assert_eq!(report.streams.len(), 1);
    assert_eq!(report.get("ads").unwrap().records, 2);
    assert!(report.get("advertisers").is_none());
}

#[tokio::test]
async fn test_sync_failed_parent_skips_children() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/2026-01/advertisers/me"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;
    mount_json(
        &server,
        "POST",
        "/2026-01/marketing-solutions/campaigns/search",
        json!({"data": [{"id": "c1"}]}),
    )
    .await;

    let mut tap = Tap::new(&config(&server, &[])).unwrap();
    let mut sink = CollectingSink::new();
    let report = tap
        .sync(&strings(&["advertisers", "campaigns", "ads", "creatives"]), &mut sink)
        .await
        .unwrap();

    assert_eq!(report.get("campaigns").unwrap().status, StreamStatus::Succeeded);

    let advertisers = report.get("advertisers").unwrap();
    assert_eq!(advertisers.status, StreamStatus::Failed);
    assert!(advertisers.error.as_deref().unwrap().contains("403"));

    for child in ["ads", "creatives"] {
        let child = report.get(child).unwrap();
        assert_eq!(child.status, StreamStatus::Skipped);
        assert!(child.error.as_deref().unwrap().contains("advertisers"));
    }

    assert_eq!(report.status(), SyncStatus::Partial);
    assert_eq!(kinds(&sink, "advertisers"), vec!["SCHEMA"]);
    assert!(kinds(&sink, "ads").is_empty());
}

#[tokio::test]
async fn test_sync_auth_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let mut tap = Tap::new(&config(&server, &[])).unwrap();
    let mut sink = CollectingSink::new();
    let err = tap.sync(&[], &mut sink).await.unwrap_err();

    assert!(matches!(err, Error::OAuth2 { .. }));
    assert!(err.is_fatal_for_run());
}

#[tokio::test]
async fn test_sync_unknown_stream_selection() {
    let server = MockServer::start().await;

    let mut tap = Tap::new(&config(&server, &[])).unwrap();
    let mut sink = CollectingSink::new();
    let err = tap
        .sync(&strings(&["campaigns", "nope"]), &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StreamNotFound { ref stream } if stream == "nope"));
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn test_sync_report_stream() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/2026-01/statistics/report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Rows": [
                {"Day": "01/02/2024", "Clicks": "42", "Currency": "USD"},
                {"Day": "01/03/2024", "Clicks": "7", "Currency": "USD"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server, &["5"]);
    config.reports.push(ReportConfig::new(
        "daily",
        strings(&["Day"]),
        strings(&["Clicks"]),
    ));

    let mut tap = Tap::new(&config)
        .unwrap()
        .with_sync_config(SyncConfig::new().with_max_pages(10));
    let mut sink = CollectingSink::new();
    let report = tap.sync(&strings(&["daily"]), &mut sink).await.unwrap();

    assert_eq!(report.get("daily").unwrap().records, 2);

    let Message::Schema { key_properties, .. } = &sink.messages()[0] else {
        panic!("expected a schema first");
    };
    assert_eq!(key_properties, &strings(&["Day"]));

    let rows = sink.records("daily");
    let Message::Record { record, .. } = rows[0] else {
        panic!("expected a record");
    };
    assert_eq!(
        Value::Object(record.clone()),
        json!({"Day": "2024-01-02", "Clicks": 42, "Currency": "USD"})
    );
}

// ============================================================================
// Report types
// ============================================================================

#[test]
fn test_sync_report_status() {
    let mut report = SyncReport::new();
    assert_eq!(report.status(), SyncStatus::Succeeded);

    report.push(StreamReport::succeeded("a", 3, 1));
    assert_eq!(report.status(), SyncStatus::Succeeded);

    report.push(StreamReport::failed("b", 1, 1, "HTTP 500"));
    assert_eq!(report.status(), SyncStatus::Partial);
    assert_eq!(report.total_records(), 4);

    let mut failed = SyncReport::new();
    failed.push(StreamReport::failed("a", 0, 0, "boom"));
    failed.push(StreamReport::skipped("b", "parent failed"));
    assert_eq!(failed.status(), SyncStatus::Failed);
    assert_eq!(failed.count(StreamStatus::Skipped), 1);
}

#[test]
fn test_stream_report_serialization() {
    let value = serde_json::to_value(StreamReport::skipped("ads", "parent failed")).unwrap();
    assert_eq!(
        value,
        json!({
            "stream": "ads",
            "status": "SKIPPED",
            "records": 0,
            "pages": 0,
            "error": "parent failed",
            "duration_ms": 0
        })
    );

    let value = serde_json::to_value(StreamReport::succeeded("ads", 2, 1)).unwrap();
    assert!(value.get("error").is_none());
}
