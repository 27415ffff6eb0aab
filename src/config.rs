//! Tap configuration
//!
//! The user-supplied configuration: credentials, advertiser scoping, the
//! report window start and the report definitions. Loaded from JSON or YAML
//! and validated before any request is issued.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "https://api.criteo.com";

/// Default OAuth2 token endpoint
pub const DEFAULT_AUTH_URL: &str = "https://api.criteo.com/oauth2/token";

/// Fields that must be present in every config
const REQUIRED_FIELDS: [&str; 4] = ["client_id", "client_secret", "advertiser_ids", "start_date"];

// ============================================================================
// Report Config
// ============================================================================

/// One user-defined statistics report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Stream name for this report
    pub name: String,

    /// Dimension identifiers, in configured order
    pub dimensions: Vec<String>,

    /// Metric identifiers, in configured order
    pub metrics: Vec<String>,

    /// Reporting currency
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl ReportConfig {
    /// Create a report config with the default currency
    pub fn new(
        name: impl Into<String>,
        dimensions: Vec<String>,
        metrics: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dimensions,
            metrics,
            currency: default_currency(),
        }
    }

    /// Set the currency
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

// ============================================================================
// Tap Config
// ============================================================================

/// Validated tap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapConfig {
    /// OAuth2 client id
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Advertiser allow-list (empty = no scoping)
    pub advertiser_ids: Vec<String>,
    /// Report window start
    pub start_date: DateTime<Utc>,
    /// Report definitions
    pub reports: Vec<ReportConfig>,
    /// API base URL
    pub api_url: String,
    /// Token endpoint
    pub auth_url: String,
    /// Client-side request rate
    pub requests_per_second: u32,
    /// Retries for transient failures
    pub max_retries: u32,
}

/// Wire shape of the config file
#[derive(Debug, Deserialize)]
struct RawTapConfig {
    client_id: String,
    client_secret: String,
    advertiser_ids: Vec<String>,
    start_date: String,
    #[serde(default)]
    reports: Option<Vec<ReportConfig>>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    auth_url: Option<String>,
    #[serde(default)]
    requests_per_second: Option<u32>,
    #[serde(default)]
    max_retries: Option<u32>,
}

impl TapConfig {
    /// Build a config from a JSON value, checking required fields first
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::config("config must be a JSON object"))?;

        for field in REQUIRED_FIELDS {
            if obj.get(field).map_or(true, Value::is_null) {
                return Err(Error::missing_field(field));
            }
        }

        let raw: RawTapConfig = serde_json::from_value(value.clone())?;

        let start_date = parse_start_date(&raw.start_date)?;

        let config = Self {
            client_id: raw.client_id,
            client_secret: raw.client_secret,
            advertiser_ids: raw.advertiser_ids,
            start_date,
            reports: raw.reports.unwrap_or_default(),
            api_url: raw.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth_url: raw.auth_url.unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            requests_per_second: raw.requests_per_second.unwrap_or(10),
            max_retries: raw.max_retries.unwrap_or(3),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&value)
    }

    /// Check semantic constraints the wire format cannot express
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::invalid_value("client_id", "must not be empty"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(Error::invalid_value("client_secret", "must not be empty"));
        }
        if self.advertiser_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::invalid_value(
                "advertiser_ids",
                "entries must not be empty",
            ));
        }

        url::Url::parse(&self.api_url)?;
        url::Url::parse(&self.auth_url)?;

        if self.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "requests_per_second",
                "must be greater than zero",
            ));
        }

        let mut seen = HashSet::new();
        for report in &self.reports {
            if report.name.trim().is_empty() {
                return Err(Error::invalid_value("reports", "report name must not be empty"));
            }
            if !seen.insert(report.name.as_str()) {
                return Err(Error::invalid_value(
                    "reports",
                    format!("duplicate report name '{}'", report.name),
                ));
            }
        }

        Ok(())
    }

    /// Whether the advertiser allow-list is active
    pub fn has_advertiser_scope(&self) -> bool {
        !self.advertiser_ids.is_empty()
    }

    /// JSON Schema describing the accepted configuration
    pub fn spec() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": REQUIRED_FIELDS,
            "properties": {
                "client_id": { "type": "string" },
                "client_secret": { "type": "string", "secret": true },
                "advertiser_ids": { "type": "array", "items": { "type": "string" } },
                "start_date": { "type": "string", "format": "date-time" },
                "reports": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "dimensions", "metrics"],
                        "properties": {
                            "name": { "type": "string" },
                            "dimensions": { "type": "array", "items": { "type": "string" } },
                            "metrics": { "type": "array", "items": { "type": "string" } },
                            "currency": { "type": "string", "default": "USD" }
                        }
                    }
                },
                "api_url": { "type": "string", "format": "uri", "default": DEFAULT_API_URL },
                "auth_url": { "type": "string", "format": "uri", "default": DEFAULT_AUTH_URL },
                "requests_per_second": { "type": "integer", "default": 10 },
                "max_retries": { "type": "integer", "default": 3 }
            }
        })
    }
}

/// Load a config file; `.yaml`/`.yml` files are parsed as YAML, anything else as JSON
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TapConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => TapConfig::from_yaml_str(&content),
        _ => TapConfig::from_json_str(&content),
    }
}

/// Offset-less datetimes accepted for `start_date`, read as UTC
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse the report window start: RFC 3339, naive datetime, or a bare date
fn parse_start_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(Error::invalid_value(
        "start_date",
        format!("'{value}' is not an ISO-8601 date or datetime"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use test_case::test_case;

    fn base_config() -> Value {
        json!({
            "client_id": "my-client",
            "client_secret": "my-secret",
            "advertiser_ids": ["1", "2"],
            "start_date": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = TapConfig::from_value(&base_config()).unwrap();

        assert_eq!(config.client_id, "my-client");
        assert_eq!(config.advertiser_ids, vec!["1", "2"]);
        assert_eq!(
            config.start_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(config.reports.is_empty());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.max_retries, 3);
        assert!(config.has_advertiser_scope());
    }

    #[test]
    fn test_missing_required_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut value = base_config();
            value.as_object_mut().unwrap().remove(field);

            let err = TapConfig::from_value(&value).unwrap_err();
            assert!(
                matches!(&err, Error::MissingConfigField { field: f } if f == field),
                "unexpected error for {field}: {err}"
            );
        }
    }

    #[test]
    fn test_empty_advertiser_ids_means_no_scope() {
        let mut value = base_config();
        value["advertiser_ids"] = json!([]);

        let config = TapConfig::from_value(&value).unwrap();
        assert!(!config.has_advertiser_scope());
    }

    #[test]
    fn test_report_currency_defaults_to_usd() {
        let mut value = base_config();
        value["reports"] = json!([
            {"name": "daily", "dimensions": ["Day"], "metrics": ["Clicks"]},
            {"name": "eur", "dimensions": ["Day"], "metrics": ["Clicks"], "currency": "EUR"}
        ]);

        let config = TapConfig::from_value(&value).unwrap();
        assert_eq!(config.reports[0].currency, "USD");
        assert_eq!(config.reports[1].currency, "EUR");
    }

    #[test]
    fn test_duplicate_report_names_rejected() {
        let mut value = base_config();
        value["reports"] = json!([
            {"name": "daily", "dimensions": ["Day"], "metrics": ["Clicks"]},
            {"name": "daily", "dimensions": ["Hour"], "metrics": ["Clicks"]}
        ]);

        let err = TapConfig::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("duplicate report name 'daily'"));
    }

    #[test]
    fn test_start_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_start_date("2024-03-05").unwrap(), expected);
        assert_eq!(parse_start_date("2024-03-05T00:00:00").unwrap(), expected);
        assert_eq!(parse_start_date("2024-03-05T01:00:00+01:00").unwrap(), expected);
        assert!(parse_start_date("05/03/2024").is_err());
    }

    #[test_case("2024-03-05T00:00:00.000000" ; "fractional seconds")]
    #[test_case("2024-03-05 00:00:00" ; "space separator")]
    #[test_case("2024-03-05 00:00:00.5" ; "space separator with fraction")]
    #[test_case("2024-03-05T00:00:00.000Z" ; "utc with millis")]
    fn test_start_date_naive_variants(value: &str) {
        let parsed = parse_start_date(value).unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_config_accepts_microsecond_start_date() {
        let mut value = base_config();
        value["start_date"] = json!("2024-01-01T00:00:00.000000");
        let config = TapConfig::from_value(&value).unwrap();
        assert_eq!(
            config.start_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_api_url() {
        let mut value = base_config();
        value["api_url"] = json!("not a url");
        assert!(matches!(
            TapConfig::from_value(&value),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_load_json_and_yaml_files() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, base_config().to_string()).unwrap();
        let from_json = load_config(&json_path).unwrap();

        let yaml_path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        writeln!(
            file,
            "client_id: my-client\nclient_secret: my-secret\nadvertiser_ids: [\"1\", \"2\"]\nstart_date: \"2024-01-01T00:00:00Z\""
        )
        .unwrap();
        let from_yaml = load_config(&yaml_path).unwrap();

        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_spec_lists_required_fields() {
        let spec = TapConfig::spec();
        let required = spec["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert!(spec["properties"]["reports"].is_object());
    }
}
