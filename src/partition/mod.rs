//! Partition routing module
//!
//! Supports: Parent stream
//!
//! # Overview
//!
//! Child resources such as ads and creatives are listed per advertiser.
//! The parent stream runs first; each distinct parent record yields one
//! [`Context`](crate::template::Context) that fills the child's path
//! placeholders.

mod routers;
mod types;

pub use routers::ParentRouter;
pub use types::ContextRule;
