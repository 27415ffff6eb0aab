//! Partition router implementations

use super::types::ContextRule;
use crate::template::Context;
use crate::types::Record;
use std::collections::HashSet;
use tracing::debug;

// ============================================================================
// Parent Router
// ============================================================================

/// Parent stream-based partition router
///
/// Collects one child context per distinct parent record as the parent
/// stream runs.
#[derive(Debug, Clone)]
pub struct ParentRouter {
    /// Parent stream name
    parent: String,
    /// How a parent record becomes a context
    rule: ContextRule,
    /// Context ids already collected
    seen: HashSet<String>,
    /// Contexts in first-seen order
    contexts: Vec<Context>,
}

impl ParentRouter {
    /// Create a new parent router
    pub fn new(parent: impl Into<String>, rule: ContextRule) -> Self {
        Self {
            parent: parent.into(),
            rule,
            seen: HashSet::new(),
            contexts: Vec::new(),
        }
    }

    /// Name of the parent stream
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Offer an emitted parent record
    pub fn observe(&mut self, record: &Record) {
        let Some(context) = self.rule.context_for(record) else {
            debug!(parent = %self.parent, "Parent record has no child context");
            return;
        };

        if self.seen.insert(context.id()) {
            self.contexts.push(context);
        }
    }

    /// Offer several parent records
    pub fn observe_all<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) {
        for record in records {
            self.observe(record);
        }
    }

    /// Contexts collected so far
    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// Take the collected contexts
    pub fn into_contexts(self) -> Vec<Context> {
        self.contexts
    }
}
