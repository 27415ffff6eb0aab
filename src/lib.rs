//! # tap-criteo
//!
//! Extracts Criteo Marketing Solutions entities and statistics reports as
//! schema-typed record streams for a data-integration pipeline.
//!
//! ## Features
//!
//! - **Static streams**: audiences, advertisers, campaigns, ad sets, ads, creatives
//! - **Report streams**: one per configured report, schema built from its dimensions and metrics
//! - **OAuth2 client credentials**: cached bearer token, refreshed on expiry or 401
//! - **Offset pagination**: full pages continue, short or empty pages stop
//! - **Parent/child streams**: ads and creatives run once per advertiser
//! - **JSON lines output**: `SCHEMA`, `RECORD`, `STREAM_END` messages
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_criteo::config::load_config;
//! use tap_criteo::output::JsonLinesWriter;
//! use tap_criteo::tap::Tap;
//!
//! #[tokio::main]
//! async fn main() -> tap_criteo::Result<()> {
//!     let config = load_config("config.json")?;
//!     let mut tap = Tap::new(&config)?;
//!
//!     let mut out = JsonLinesWriter::stdout();
//!     let report = tap.sync(&[], &mut out).await?;
//!     eprintln!("{} records", report.total_records());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Tap                                  │
//! │  discover_streams() → [StreamDefinition]   sync() → SyncReport  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Partition │  Normalize  │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OAuth2   │ GET/POST  │ Offset        │ Parent    │ Flatten     │
//! │ Bearer   │ Retry     │ None          │ context   │ Scope       │
//! │          │ Rate Limit│               │           │ Coerce      │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// Path placeholder rendering
pub mod template;

/// OAuth2 client-credentials authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Record extraction from responses
pub mod decode;

/// JSON Schema types and packaged stream schemas
pub mod schema;

/// Per-record normalization
pub mod normalize;

/// Parent to child context routing
pub mod partition;

/// Stream definitions and the report stream
pub mod stream;

/// Page loop for one stream pass
pub mod engine;

/// Message sinks and the JSON lines writer
pub mod output;

/// Discovery and orchestration
pub mod tap;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{load_config, TapConfig};
pub use tap::{discover_streams, Tap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
