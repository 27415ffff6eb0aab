//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{PageToken, Paginator};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Requests `?offset=<n>&limit=<page_size>` and advances by `page_size`
/// while pages come back full. A short page is the last one.
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: String,
    /// Number of records per page
    pub page_size: u32,
}

impl OffsetPaginator {
    /// Create a new offset paginator
    pub fn new(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param: limit_param.into(),
            page_size,
        }
    }
}

impl Paginator for OffsetPaginator {
    fn page_params(&self, token: Option<PageToken>) -> HashMap<String, String> {
        let offset = token.map_or(0, |t| t.value());

        let mut params = HashMap::new();
        params.insert(self.offset_param.clone(), offset.to_string());
        params.insert(self.limit_param.clone(), self.page_size.to_string());
        params
    }

    fn next_token(
        &self,
        _body: &Value,
        records_count: usize,
        previous: Option<PageToken>,
    ) -> Option<PageToken> {
        if records_count == 0 || records_count != self.page_size as usize {
            return None;
        }

        let offset = previous.map_or(0, |t| t.value());
        Some(PageToken::offset(offset + u64::from(self.page_size)))
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request only
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn page_params(&self, _token: Option<PageToken>) -> HashMap<String, String> {
        HashMap::new()
    }

    fn next_token(
        &self,
        _body: &Value,
        _records_count: usize,
        _previous: Option<PageToken>,
    ) -> Option<PageToken> {
        None
    }
}
