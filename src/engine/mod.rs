//! Execution engine module
//!
//! The page loop for a single stream pass.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Drives one stream through its pages for one context
//! - `SyncConfig` - Configuration for sync operations
//! - Message types for output (Schema, Record, StreamEnd)
//!
//! A page is decoded and normalized in full before any of its records is
//! sent, so a failing page never leaves half its records behind.

mod types;

pub use types::{Message, SyncConfig, SyncStats};

use crate::decode::JsonDecoder;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::normalize::Normalized;
use crate::output::MessageSink;
use crate::pagination::{PageToken, PaginationState, Paginator};
use crate::partition::ParentRouter;
use crate::stream::StreamDefinition;
use crate::template::Context;
use crate::types::{JsonValue, Record};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for extracting stream pages
pub struct SyncEngine {
    /// HTTP client
    client: HttpClient,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics across every pass
    stats: SyncStats,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// The HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The sync configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Run one pass of `stream` for `context`
    ///
    /// Records are sent to `sink` only when `emit` is set; a parent that
    /// runs just to feed its children passes `false`. Every emitted record
    /// is also offered to `router`. The engine's running stats include a
    /// failed pass up to the page that failed.
    pub async fn sync_stream(
        &mut self,
        stream: &StreamDefinition,
        context: &Context,
        sink: &mut dyn MessageSink,
        emit: bool,
        router: Option<&mut ParentRouter>,
    ) -> Result<SyncStats> {
        let start = Instant::now();
        let mut pass = SyncStats::new();

        let result = self
            .run_pages(stream, context, sink, emit, router, &mut pass)
            .await;

        pass.set_duration(start.elapsed().as_millis() as u64);
        self.stats.merge(&pass);
        result?;

        pass.add_partition();
        self.stats.add_partition();

        info!(
            stream = stream.name(),
            records = pass.records_synced,
            pages = pass.pages_fetched,
            "Completed stream pass"
        );

        Ok(pass)
    }

    async fn run_pages(
        &self,
        stream: &StreamDefinition,
        context: &Context,
        sink: &mut dyn MessageSink,
        emit: bool,
        mut router: Option<&mut ParentRouter>,
        pass: &mut SyncStats,
    ) -> Result<()> {
        let path = stream.render_path(context)?;
        let body = stream.build_body(Utc::now());
        let decoder = JsonDecoder::with_path(stream.records_path());
        let paginator = stream.paginator();
        let mut state = PaginationState::new();

        debug!(stream = stream.name(), %path, "Starting stream pass");

        loop {
            let request = page_request(paginator.as_ref(), state.token, body.as_ref());
            let response: JsonValue = self
                .client
                .request_json(stream.method().into(), &path, &request)
                .await?;
            let extracted_at = Utc::now();

            let raw = decoder.decode(&response)?;
            let fetched = raw.len();
            pass.add_page();

            let mut page: Vec<Record> = Vec::with_capacity(fetched);
            for record in raw {
                match stream.normalize(record) {
                    Normalized::Emit(record) => page.push(record),
                    Normalized::Suppressed => pass.add_suppressed(1),
                }
            }

            if let Some(router) = router.as_deref_mut() {
                router.observe_all(&page);
            }

            let kept = page.len() as u64;
            if emit {
                for record in page {
                    sink.send(Message::record(stream.name(), record, extracted_at))
                        .await?;
                }
            }
            pass.add_records(kept);

            let next = paginator.next_token(&response, fetched, state.token);
            state.advance(fetched, next);

            debug!(
                stream = stream.name(),
                page = state.pages,
                records = fetched,
                next = ?state.token.filter(|_| !state.done),
                "Fetched page"
            );

            if state.done {
                return Ok(());
            }

            if self.config.page_limit_reached(state.pages) {
                warn!(
                    stream = stream.name(),
                    max_pages = self.config.max_pages,
                    "Stopping at page limit"
                );
                return Ok(());
            }
        }
    }
}

/// Query and body for the page identified by `token`
fn page_request(
    paginator: &dyn Paginator,
    token: Option<PageToken>,
    body: Option<&JsonValue>,
) -> RequestConfig {
    let request = RequestConfig::new().queries(paginator.page_params(token));
    match body {
        Some(body) => request.json(body.clone()),
        None => request,
    }
}
