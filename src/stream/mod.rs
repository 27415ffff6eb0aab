//! Stream definitions
//!
//! A [`StreamDefinition`] describes one Criteo resource: where to request
//! it, how to build the request body, how to page through it, and how to
//! normalize its records. The fixed resources live in [`catalog`]; report
//! streams are built from configuration by [`report_stream`].

mod catalog;
mod report;
mod types;

pub use catalog::{static_streams, LISTING_PAGE_SIZE, STATIC_STREAM_NAMES};
pub use report::{field_property, report_stream, ReportStream, REPORT_PATH, REPORT_RECORDS_PATH};
pub use types::{RequestBody, StreamDefinition, StreamDefinitionBuilder, StreamKind};
