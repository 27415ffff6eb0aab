//! Pagination module
//!
//! Supports: Offset, None
//!
//! # Overview
//!
//! A paginator looks at each decoded page and decides which page comes
//! next. The Criteo listing endpoints for ads and creatives page with
//! `offset` / `limit`; every other endpoint returns everything at once.

mod strategies;
mod types;

pub use strategies::{NoPaginator, OffsetPaginator};
pub use types::{PageToken, PaginationConfig, PaginationState, Paginator};
