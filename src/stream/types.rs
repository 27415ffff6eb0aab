//! Stream definition types

use super::report::ReportStream;
use crate::error::{Error, Result};
use crate::normalize::{Normalized, Normalizer};
use crate::pagination::{PaginationConfig, Paginator};
use crate::partition::ContextRule;
use crate::schema::JsonSchema;
use crate::template::{extract_variables, render, Context};
use crate::types::{JsonValue, Method, Record};
use chrono::{DateTime, Utc};
use serde_json::json;

/// How a stream builds its request body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// An empty JSON object, as the search endpoints expect
    EmptyObject,
    /// Audience search scoped to advertisers
    AudienceSearch {
        /// Advertiser ids to search
        advertiser_ids: Vec<String>,
    },
}

impl RequestBody {
    /// Render the body, if any
    pub fn build(&self) -> Option<JsonValue> {
        match self {
            RequestBody::None => None,
            RequestBody::EmptyObject => Some(json!({})),
            RequestBody::AudienceSearch { advertiser_ids } => Some(json!({
                "data": {
                    "type": "AudienceSearchEntity",
                    "attributes": {"advertiserIds": advertiser_ids}
                }
            })),
        }
    }
}

/// What kind of stream a definition describes
#[derive(Debug, Clone, PartialEq)]
pub enum StreamKind {
    /// A fixed Criteo resource with a packaged schema
    Static,
    /// A statistics report built from configuration
    Report(ReportStream),
}

/// Declarative description of one stream
///
/// Built once per run through [`StreamDefinitionBuilder`] and never
/// modified afterwards.
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    name: String,
    path: String,
    method: Method,
    schema: JsonSchema,
    primary_keys: Vec<String>,
    records_path: String,
    parent: Option<String>,
    pagination: PaginationConfig,
    body: RequestBody,
    normalizer: Normalizer,
    child_context: Option<ContextRule>,
    kind: StreamKind,
}

impl StreamDefinition {
    /// Start building a definition
    pub fn builder(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
    ) -> StreamDefinitionBuilder {
        StreamDefinitionBuilder {
            name: name.into(),
            method,
            path: path.into(),
            schema: JsonSchema::new(),
            primary_keys: Vec::new(),
            records_path: "$.data[*]".to_string(),
            parent: None,
            pagination: PaginationConfig::None,
            body: RequestBody::None,
            normalizer: Normalizer::Passthrough,
            child_context: None,
            kind: StreamKind::Static,
        }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path template
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Record schema
    pub fn schema(&self) -> &JsonSchema {
        &self.schema
    }

    /// Primary key fields, in order
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// JSONPath of the records in a response
    pub fn records_path(&self) -> &str {
        &self.records_path
    }

    /// Parent stream name, if this stream runs per parent record
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Pagination configuration
    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    /// Normalizer applied to each record
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Rule producing child contexts from this stream's records
    pub fn child_context(&self) -> Option<&ContextRule> {
        self.child_context.as_ref()
    }

    /// Static or report
    pub fn kind(&self) -> &StreamKind {
        &self.kind
    }

    /// Whether this is a configured report stream
    pub fn is_report(&self) -> bool {
        matches!(self.kind, StreamKind::Report(_))
    }

    /// Render the request path for a context
    pub fn render_path(&self, context: &Context) -> Result<String> {
        render(&self.path, context)
    }

    /// Build the JSON body of a request sent at `now`
    pub fn build_body(&self, now: DateTime<Utc>) -> Option<JsonValue> {
        match &self.kind {
            StreamKind::Static => self.body.build(),
            StreamKind::Report(report) => Some(report.payload(now)),
        }
    }

    /// Normalize one raw record
    pub fn normalize(&self, record: Record) -> Normalized {
        self.normalizer.normalize(&self.name, record)
    }

    /// A fresh paginator for one pass over the stream
    pub fn paginator(&self) -> Box<dyn Paginator> {
        self.pagination.build()
    }
}

/// Builder for [`StreamDefinition`]
#[derive(Debug, Clone)]
pub struct StreamDefinitionBuilder {
    name: String,
    method: Method,
    path: String,
    schema: JsonSchema,
    primary_keys: Vec<String>,
    records_path: String,
    parent: Option<String>,
    pagination: PaginationConfig,
    body: RequestBody,
    normalizer: Normalizer,
    child_context: Option<ContextRule>,
    kind: StreamKind,
}

impl StreamDefinitionBuilder {
    /// Set the schema
    #[must_use]
    pub fn schema(mut self, schema: JsonSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the primary keys
    #[must_use]
    pub fn primary_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the records JSONPath (default `$.data[*]`)
    #[must_use]
    pub fn records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = path.into();
        self
    }

    /// Run once per record of a parent stream
    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set pagination
    #[must_use]
    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the request body rule
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Set the normalizer
    #[must_use]
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Hand a context to child streams for each record
    #[must_use]
    pub fn child_context(mut self, rule: ContextRule) -> Self {
        self.child_context = Some(rule);
        self
    }

    /// Mark as a report stream
    #[must_use]
    pub fn report(mut self, report: ReportStream) -> Self {
        self.kind = StreamKind::Report(report);
        self
    }

    /// Validate and build
    ///
    /// Every primary key must be a schema property, and every path
    /// placeholder needs a parent stream to fill it.
    pub fn build(self) -> Result<StreamDefinition> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Stream name cannot be empty"));
        }

        if let Some(key) = self
            .primary_keys
            .iter()
            .find(|key| !self.schema.has_property(key))
        {
            return Err(Error::config(format!(
                "Stream '{}' has primary key '{key}' that its schema does not declare",
                self.name
            )));
        }

        let placeholders = extract_variables(&self.path);
        if !placeholders.is_empty() && self.parent.is_none() {
            return Err(Error::config(format!(
                "Stream '{}' path '{}' has placeholders ({}) but no parent stream",
                self.name,
                self.path,
                placeholders.join(", ")
            )));
        }

        if self.parent.as_deref() == Some(self.name.as_str()) {
            return Err(Error::config(format!(
                "Stream '{}' cannot be its own parent",
                self.name
            )));
        }

        Ok(StreamDefinition {
            name: self.name,
            path: self.path,
            method: self.method,
            schema: self.schema,
            primary_keys: self.primary_keys,
            records_path: self.records_path,
            parent: self.parent,
            pagination: self.pagination,
            body: self.body,
            normalizer: self.normalizer,
            child_context: self.child_context,
            kind: self.kind,
        })
    }
}
