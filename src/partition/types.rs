//! Partition types
//!
//! A [`ContextRule`] says which fields of a parent record become the
//! context of a child stream partition.

use crate::template::Context;
use crate::types::{JsonValue, Record};

/// Maps parent record fields to child context keys
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextRule {
    /// `(context key, parent record key)` pairs
    fields: Vec<(String, String)>,
}

impl ContextRule {
    /// Create an empty rule
    pub fn new() -> Self {
        Self::default()
    }

    /// The `{id: record.id}` rule used by advertisers
    pub fn id() -> Self {
        Self::new().field("id", "id")
    }

    /// Copy `record_key` (dotted for nested fields) into `context_key`
    #[must_use]
    pub fn field(mut self, context_key: impl Into<String>, record_key: impl Into<String>) -> Self {
        self.fields.push((context_key.into(), record_key.into()));
        self
    }

    /// Context keys this rule produces
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Build the child context for a parent record
    ///
    /// Returns `None` when the record lacks one of the fields or holds
    /// `null` there.
    pub fn context_for(&self, record: &Record) -> Option<Context> {
        let mut context = Context::new();

        for (context_key, record_key) in &self.fields {
            let value = extract_key(record, record_key)?;
            context.insert(context_key.clone(), value.clone());
        }

        Some(context)
    }
}

/// Look up a possibly nested key like `id` or `data.id`
fn extract_key<'a>(record: &'a Record, key: &str) -> Option<&'a JsonValue> {
    let mut parts = key.split('.');
    let mut current = record.get(parts.next()?)?;

    for part in parts {
        current = current.get(part)?;
    }

    match current {
        JsonValue::Null | JsonValue::Object(_) | JsonValue::Array(_) => None,
        scalar => Some(scalar),
    }
}
