//! Tap orchestration
//!
//! Discovers the streams for a configuration and drives them to
//! completion, parents before children.
//!
//! # Overview
//!
//! - [`discover_streams`] - static streams followed by configured reports
//! - [`Tap`] - check, catalog and sync
//! - [`SyncReport`] - per-stream outcomes of a run

mod orchestrator;
mod types;

pub use orchestrator::{discover_streams, Tap, CHECK_PATH};
pub use types::{CheckResult, StreamReport, StreamStatus, SyncReport, SyncStatus};

#[cfg(test)]
mod tests;
