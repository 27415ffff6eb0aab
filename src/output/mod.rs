//! Output module
//!
//! Delivers engine [`Message`](crate::engine::Message)s downstream.
//!
//! # Overview
//!
//! This module provides:
//! - [`MessageSink`] - where the engine sends schema, record and end messages
//! - [`JsonLinesWriter`] - one JSON object per line, normally on stdout
//! - [`CollectingSink`] - keeps messages in memory

mod sink;
mod writer;

pub use sink::{CollectingSink, MessageSink};
pub use writer::JsonLinesWriter;
