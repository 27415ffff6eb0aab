//! Statistics report streams
//!
//! Each configured report becomes one stream against
//! `/2026-01/statistics/report`. Its schema and primary key come from the
//! report's dimensions and metrics, so they are only known once the
//! configuration is loaded.

use super::types::StreamDefinition;
use crate::config::{ReportConfig, TapConfig};
use crate::error::{Error, Result};
use crate::normalize::{CoercionTable, Normalizer};
use crate::pagination::PaginationConfig;
use crate::schema::{JsonSchema, JsonType, SchemaProperty};
use crate::types::{JsonValue, Method};
use chrono::{DateTime, Utc};
use serde_json::json;

/// Path of the statistics endpoint
pub const REPORT_PATH: &str = "/2026-01/statistics/report";

/// Where report rows sit in the response
pub const REPORT_RECORDS_PATH: &str = "$.Rows[*]";

/// Schema type of a known report dimension or metric
pub fn field_property(field: &str) -> Option<SchemaProperty> {
    let property = match field {
        "Adset" | "AdsetId" | "Campaign" | "CampaignId" | "Advertiser" | "AdvertiserId"
        | "Category" | "CategoryId" | "Os" | "OS" | "Device" | "Currency" => {
            SchemaProperty::string()
        }
        "Year" | "Month" | "Week" | "Day" => SchemaProperty::date(),
        "Hour" => SchemaProperty::date_time(),
        "Clicks" | "Displays" | "Visits" => SchemaProperty::new(JsonType::Integer),
        "AdvertiserCost" => SchemaProperty::new(JsonType::Number),
        _ => return None,
    };
    Some(property)
}

/// The report-specific part of a report stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportStream {
    dimensions: Vec<String>,
    metrics: Vec<String>,
    currency: String,
    start_date: DateTime<Utc>,
    advertiser_ids: Vec<String>,
}

impl ReportStream {
    /// Validate a report configuration
    ///
    /// Fails on an empty dimension or metric list and on any field without
    /// a known type.
    pub fn new(
        report: &ReportConfig,
        start_date: DateTime<Utc>,
        advertiser_ids: Vec<String>,
    ) -> Result<Self> {
        if report.dimensions.is_empty() {
            return Err(Error::invalid_value(
                format!("reports.{}.dimensions", report.name),
                "at least one dimension is required",
            ));
        }
        if report.metrics.is_empty() {
            return Err(Error::invalid_value(
                format!("reports.{}.metrics", report.name),
                "at least one metric is required",
            ));
        }

        if let Some(unknown) = report
            .dimensions
            .iter()
            .chain(&report.metrics)
            .find(|field| field_property(field).is_none())
        {
            return Err(Error::unknown_report_field(&report.name, unknown));
        }

        Ok(Self {
            dimensions: report.dimensions.clone(),
            metrics: report.metrics.clone(),
            currency: report.currency.clone(),
            start_date,
            advertiser_ids,
        })
    }

    /// Dimensions, in configured order
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Metrics, in configured order
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Reporting currency
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// One property per metric and dimension, plus `Currency`
    pub fn schema(&self, name: &str) -> JsonSchema {
        let mut schema = JsonSchema::new().with_title(name);
        schema.add_property("Currency", SchemaProperty::string());

        for field in self.metrics.iter().chain(&self.dimensions) {
            if let Some(property) = field_property(field) {
                schema.add_property(field, property);
            }
        }
        schema
    }

    /// The primary key is the dimensions
    pub fn primary_keys(&self) -> Vec<String> {
        self.dimensions.clone()
    }

    /// Request body for a report covering start date up to `now`
    pub fn payload(&self, now: DateTime<Utc>) -> JsonValue {
        let mut payload = json!({
            "dimensions": self.dimensions,
            "metrics": self.metrics,
            "currency": self.currency,
            "format": "json",
            "timezone": "UTC",
            "startDate": self.start_date.to_rfc3339(),
            "endDate": now.to_rfc3339(),
        });

        if !self.advertiser_ids.is_empty() {
            payload["advertiserIds"] = JsonValue::String(self.advertiser_ids.join(","));
        }

        payload
    }
}

/// Build the stream definition for one configured report
pub fn report_stream(report: &ReportConfig, config: &TapConfig) -> Result<StreamDefinition> {
    let stream = ReportStream::new(report, config.start_date, config.advertiser_ids.clone())?;

    StreamDefinition::builder(&report.name, Method::POST, REPORT_PATH)
        .schema(stream.schema(&report.name))
        .primary_keys(stream.primary_keys())
        .records_path(REPORT_RECORDS_PATH)
        .pagination(PaginationConfig::None)
        .normalizer(Normalizer::Coerce(CoercionTable::report_defaults()))
        .report(stream)
        .build()
}
