//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{NoPaginator, OffsetPaginator};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Identifies the page to request next
///
/// Absent (`None` at the call sites) means the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageToken(u64);

impl PageToken {
    /// Token for the given record offset
    pub fn offset(offset: u64) -> Self {
        Self(offset)
    }

    /// The record offset this token points at
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaginationConfig {
    /// No pagination
    #[default]
    None,

    /// Offset-based pagination
    Offset {
        /// Query parameter name for offset
        offset_param: String,
        /// Query parameter name for limit
        limit_param: String,
        /// Number of records per page
        page_size: u32,
    },
}

impl PaginationConfig {
    /// Offset pagination using the `offset` / `limit` query parameters
    pub fn offset(page_size: u32) -> Self {
        Self::Offset {
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
            page_size,
        }
    }

    /// Build the paginator for this config
    pub fn build(&self) -> Box<dyn Paginator> {
        match self {
            Self::None => Box::new(NoPaginator),
            Self::Offset {
                offset_param,
                limit_param,
                page_size,
            } => Box::new(OffsetPaginator::new(
                offset_param.clone(),
                limit_param.clone(),
                *page_size,
            )),
        }
    }

    /// Check whether more than one page may be requested
    pub fn is_paginated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Token of the page about to be requested
    pub token: Option<PageToken>,
    /// Pages fetched so far
    pub pages: u64,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched page and move to the next token
    ///
    /// Stops when there is no next token, or when the next token does not
    /// advance past the current one.
    pub fn advance(&mut self, records_count: usize, next: Option<PageToken>) {
        self.pages += 1;
        self.total_fetched += records_count as u64;

        match next {
            Some(next) if self.token.map_or(true, |current| next > current) => {
                self.token = Some(next);
            }
            _ => self.mark_done(),
        }
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync + std::fmt::Debug {
    /// Query parameters for the page identified by `token`
    fn page_params(&self, token: Option<PageToken>) -> HashMap<String, String>;

    /// Decide the next page from a decoded response
    ///
    /// A page with zero records always ends pagination.
    fn next_token(
        &self,
        body: &Value,
        records_count: usize,
        previous: Option<PageToken>,
    ) -> Option<PageToken>;
}
