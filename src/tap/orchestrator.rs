//! Stream discovery and the run loop

use super::types::{CheckResult, StreamReport, SyncReport};
use crate::auth::OAuthCredentials;
use crate::config::TapConfig;
use crate::engine::{Message, SyncConfig, SyncEngine, SyncStats};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::output::MessageSink;
use crate::partition::ParentRouter;
use crate::stream::{report_stream, static_streams, StreamDefinition, STATIC_STREAM_NAMES};
use crate::template::Context;
use crate::types::JsonValue;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{error, info, warn};

/// Endpoint fetched by [`Tap::check`]
pub const CHECK_PATH: &str = "/2026-01/advertisers/me";

/// All streams for a configuration: the static streams, then one per report
///
/// Fails when a report reuses a static stream name or a definition names
/// a parent that does not exist.
pub fn discover_streams(config: &TapConfig) -> Result<Vec<StreamDefinition>> {
    let mut streams = static_streams(config)?;

    for report in &config.reports {
        if STATIC_STREAM_NAMES.contains(&report.name.as_str()) {
            return Err(Error::invalid_value(
                "reports",
                format!("report name '{}' collides with a built-in stream", report.name),
            ));
        }
        streams.push(report_stream(report, config)?);
    }

    let names: HashSet<&str> = streams.iter().map(StreamDefinition::name).collect();
    for stream in &streams {
        if let Some(parent) = stream.parent() {
            if !names.contains(parent) {
                return Err(Error::config(format!(
                    "Stream '{}' has unknown parent '{parent}'",
                    stream.name()
                )));
            }
        }
    }

    Ok(streams)
}

/// The Criteo tap
///
/// Owns the discovered streams and the engine that runs them.
pub struct Tap {
    streams: Vec<StreamDefinition>,
    engine: SyncEngine,
}

impl Tap {
    /// Discover streams and build an authenticated client from `config`
    pub fn new(config: &TapConfig) -> Result<Self> {
        let http = HttpClientConfig::builder()
            .base_url(config.api_url.clone())
            .max_retries(config.max_retries)
            .rate_limit(RateLimiterConfig::per_second(config.requests_per_second))
            .build();
        let client = HttpClient::with_auth(http, OAuthCredentials::from_config(config))?;

        Self::with_client(config, client)
    }

    /// Discover streams and use an already configured client
    pub fn with_client(config: &TapConfig, client: HttpClient) -> Result<Self> {
        Ok(Self {
            streams: discover_streams(config)?,
            engine: SyncEngine::new(client),
        })
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_sync_config(mut self, config: SyncConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    /// Streams in discovery order
    pub fn streams(&self) -> &[StreamDefinition] {
        &self.streams
    }

    /// Find a stream by name
    pub fn stream(&self, name: &str) -> Option<&StreamDefinition> {
        self.streams.iter().find(|s| s.name() == name)
    }

    /// Engine statistics across the runs so far
    pub fn stats(&self) -> &SyncStats {
        self.engine.stats()
    }

    /// Catalog of every stream with its schema and key
    pub fn catalog(&self) -> JsonValue {
        let streams: Vec<JsonValue> = self
            .streams
            .iter()
            .map(|stream| {
                json!({
                    "stream": stream.name(),
                    "tap_stream_id": stream.name(),
                    "schema": stream.schema().to_json(),
                    "key_properties": stream.primary_keys(),
                    "parent": stream.parent(),
                    "kind": if stream.is_report() { "report" } else { "static" },
                })
            })
            .collect();

        json!({ "streams": streams })
    }

    /// Fetch a token and the advertisers endpoint
    pub async fn check(&self) -> CheckResult {
        match self.try_check().await {
            Ok(()) => CheckResult::success(),
            Err(e) => CheckResult::failure(e.to_string()),
        }
    }

    async fn try_check(&self) -> Result<()> {
        let client = self.engine.client();
        if let Some(auth) = client.authenticator() {
            auth.get_credential().await?;
        }
        let _: JsonValue = client.get_json(CHECK_PATH).await?;
        Ok(())
    }

    /// Run the selected streams (all of them when `selection` is empty)
    ///
    /// Parents run before their children, and an unselected parent of a
    /// selected child runs without emitting. A failed stream leaves
    /// independent streams running and marks its children skipped.
    /// Configuration and authentication errors abort the whole run.
    pub async fn sync(
        &mut self,
        selection: &[String],
        sink: &mut dyn MessageSink,
    ) -> Result<SyncReport> {
        let start = Instant::now();
        let selected = self.resolve_selection(selection)?;
        let order = execution_order(&self.streams, &selected);

        let Self { streams, engine } = self;
        let needed_parents: HashSet<&str> = order
            .iter()
            .filter_map(|&i| streams[i].parent())
            .collect();

        let mut contexts: HashMap<String, Vec<Context>> = HashMap::new();
        let mut incomplete: HashSet<String> = HashSet::new();
        let mut report = SyncReport::new();

        info!(
            streams = order.len(),
            selected = selected.len(),
            "Starting sync"
        );

        for index in order {
            let stream = &streams[index];
            let name = stream.name();
            let emit = selected.contains(name);
            let started = Instant::now();

            if let Some(parent) = stream.parent() {
                if incomplete.contains(parent) {
                    let reason = Error::ParentFailed {
                        stream: name.to_string(),
                        parent: parent.to_string(),
                    };
                    warn!(stream = name, parent, "Skipping stream");
                    incomplete.insert(name.to_string());
                    if emit {
                        report.push(StreamReport::skipped(name, reason.to_string()));
                    }
                    continue;
                }
            }

            let passes = match stream.parent() {
                Some(parent) => contexts.get(parent).cloned().unwrap_or_default(),
                None => vec![Context::new()],
            };

            let mut router = stream
                .child_context()
                .filter(|_| needed_parents.contains(name))
                .map(|rule| ParentRouter::new(name, rule.clone()));

            if emit {
                sink.send(Message::schema(
                    name,
                    stream.schema().to_json(),
                    stream.primary_keys(),
                ))
                .await?;
            }

            let before = *engine.stats();
            let mut failure = None;
            for context in &passes {
                match engine
                    .sync_stream(stream, context, sink, emit, router.as_mut())
                    .await
                {
                    Ok(_) => {}
                    Err(e) if e.is_fatal_for_run() => {
                        error!(stream = name, error = %e, "Aborting sync");
                        return Err(e);
                    }
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            let records = engine.stats().records_synced - before.records_synced;
            let pages = engine.stats().pages_fetched - before.pages_fetched;
            let elapsed = started.elapsed().as_millis() as u64;

            match failure {
                None => {
                    if let Some(router) = router {
                        contexts.insert(name.to_string(), router.into_contexts());
                    }
                    if emit {
                        sink.send(Message::stream_end(name, records)).await?;
                        report.push(
                            StreamReport::succeeded(name, records, pages).with_duration(elapsed),
                        );
                    }
                    info!(stream = name, records, pages, emit, "Stream complete");
                }
                Some(e) => {
                    error!(stream = name, error = %e, "Stream failed");
                    incomplete.insert(name.to_string());
                    if emit {
                        report.push(
                            StreamReport::failed(name, records, pages, e.to_string())
                                .with_duration(elapsed),
                        );
                    }
                }
            }
        }

        sink.flush().await?;
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            status = ?report.status(),
            records = report.total_records(),
            "Sync finished"
        );

        Ok(report)
    }

    /// Names of the selected streams; empty selection means all
    fn resolve_selection(&self, selection: &[String]) -> Result<HashSet<String>> {
        let requested: Vec<&str> = selection
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if requested.is_empty() {
            return Ok(self.streams.iter().map(|s| s.name().to_string()).collect());
        }

        requested
            .into_iter()
            .map(|name| {
                self.stream(name)
                    .map(|s| s.name().to_string())
                    .ok_or_else(|| Error::StreamNotFound {
                        stream: name.to_string(),
                    })
            })
            .collect()
    }
}

impl std::fmt::Debug for Tap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tap")
            .field(
                "streams",
                &self.streams.iter().map(StreamDefinition::name).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Indices of the streams to run: the selection plus the parents it needs,
/// each parent before its children, otherwise in discovery order
fn execution_order(streams: &[StreamDefinition], selected: &HashSet<String>) -> Vec<usize> {
    let index: HashMap<&str, usize> = streams
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name(), i))
        .collect();

    let mut order = Vec::new();
    let mut scheduled = HashSet::new();

    for (i, stream) in streams.iter().enumerate() {
        if !selected.contains(stream.name()) {
            continue;
        }

        let mut chain = vec![i];
        let mut current = stream;
        while let Some(&parent) = current.parent().and_then(|p| index.get(p)) {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = &streams[parent];
        }

        for &link in chain.iter().rev() {
            if scheduled.insert(link) {
                order.push(link);
            }
        }
    }

    order
}
