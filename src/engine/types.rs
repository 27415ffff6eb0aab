//! Engine types
//!
//! Message types and configuration for the sync engine.

use crate::types::{JsonValue, Record};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message emitted during sync
///
/// Serialized as one JSON object per line with a `type` tag:
/// `SCHEMA`, `RECORD` or `STREAM_END`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Schema of a stream, sent before its first record
    Schema {
        /// Stream name
        stream: String,
        /// JSON Schema of the records
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
    },
    /// One normalized record
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: Record,
        /// When the page holding this record was fetched
        time_extracted: DateTime<Utc>,
    },
    /// A stream finished
    StreamEnd {
        /// Stream name
        stream: String,
        /// Records emitted for the stream
        records: u64,
    },
}

impl Message {
    /// Create a schema message
    pub fn schema(
        stream: impl Into<String>,
        schema: JsonValue,
        key_properties: impl Into<Vec<String>>,
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: key_properties.into(),
        }
    }

    /// Create a record message
    pub fn record(stream: impl Into<String>, record: Record, time_extracted: DateTime<Utc>) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted,
        }
    }

    /// Create a stream-end message
    pub fn stream_end(stream: impl Into<String>, records: u64) -> Self {
        Self::StreamEnd {
            stream: stream.into(),
            records,
        }
    }

    /// Name of the stream the message belongs to
    pub fn stream(&self) -> &str {
        match self {
            Self::Schema { stream, .. }
            | Self::Record { stream, .. }
            | Self::StreamEnd { stream, .. } => stream,
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Check if this is a stream-end message
    pub fn is_stream_end(&self) -> bool {
        matches!(self, Self::StreamEnd { .. })
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Maximum pages per stream pass (0 = unlimited)
    pub max_pages: u64,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max pages
    #[must_use]
    pub fn with_max_pages(mut self, max: u64) -> Self {
        self.max_pages = max;
        self
    }

    /// Whether `pages` pages reach the cap
    pub fn page_limit_reached(&self, pages: u64) -> bool {
        self.max_pages > 0 && pages >= self.max_pages
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records emitted
    pub records_synced: u64,
    /// Records dropped by the normalizer
    pub records_suppressed: u64,
    /// Pages fetched
    pub pages_fetched: u64,
    /// Contexts (parent records) processed
    pub partitions_synced: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add emitted records
    pub fn add_records(&mut self, count: u64) {
        self.records_synced += count;
    }

    /// Add suppressed records
    pub fn add_suppressed(&mut self, count: u64) {
        self.records_suppressed += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a partition
    pub fn add_partition(&mut self) {
        self.partitions_synced += 1;
    }

    /// Fold another pass into these stats
    pub fn merge(&mut self, other: &SyncStats) {
        self.records_synced += other.records_synced;
        self.records_suppressed += other.records_suppressed;
        self.pages_fetched += other.pages_fetched;
        self.partitions_synced += other.partitions_synced;
        self.duration_ms += other.duration_ms;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
