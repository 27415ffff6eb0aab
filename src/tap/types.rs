//! Tap result types

use serde::Serialize;

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Sync Report
// ============================================================================

/// Outcome of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    /// Every pass completed
    Succeeded,
    /// A pass failed
    Failed,
    /// Not run because its parent did not complete
    Skipped,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Every stream succeeded
    Succeeded,
    /// Some streams succeeded
    Partial,
    /// No stream succeeded
    Failed,
}

/// Per-stream line of a [`SyncReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    /// Stream name
    pub stream: String,
    /// Outcome
    pub status: StreamStatus,
    /// Records emitted
    pub records: u64,
    /// Pages fetched
    pub pages: u64,
    /// Why the stream failed or was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl StreamReport {
    /// A stream that completed
    pub fn succeeded(stream: impl Into<String>, records: u64, pages: u64) -> Self {
        Self {
            stream: stream.into(),
            status: StreamStatus::Succeeded,
            records,
            pages,
            error: None,
            duration_ms: 0,
        }
    }

    /// A stream that failed after emitting `records`
    pub fn failed(stream: impl Into<String>, records: u64, pages: u64, error: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            status: StreamStatus::Failed,
            records,
            pages,
            error: Some(error.into()),
            duration_ms: 0,
        }
    }

    /// A stream that never ran
    pub fn skipped(stream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            status: StreamStatus::Skipped,
            records: 0,
            pages: 0,
            error: Some(reason.into()),
            duration_ms: 0,
        }
    }

    /// Set duration
    #[must_use]
    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// One entry per selected stream, in run order
    pub streams: Vec<StreamReport>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream outcome
    pub fn push(&mut self, report: StreamReport) {
        self.streams.push(report);
    }

    /// Outcome of a stream, if it was reported
    pub fn get(&self, stream: &str) -> Option<&StreamReport> {
        self.streams.iter().find(|r| r.stream == stream)
    }

    /// Records emitted across all streams
    pub fn total_records(&self) -> u64 {
        self.streams.iter().map(|r| r.records).sum()
    }

    /// Number of streams with the given status
    pub fn count(&self, status: StreamStatus) -> usize {
        self.streams.iter().filter(|r| r.status == status).count()
    }

    /// Overall status
    ///
    /// `SUCCEEDED` when every stream succeeded (or none ran), `FAILED` when
    /// none did, `PARTIAL` otherwise.
    pub fn status(&self) -> SyncStatus {
        let succeeded = self.count(StreamStatus::Succeeded);
        if succeeded == self.streams.len() {
            SyncStatus::Succeeded
        } else if succeeded == 0 {
            SyncStatus::Failed
        } else {
            SyncStatus::Partial
        }
    }
}
