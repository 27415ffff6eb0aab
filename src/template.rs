//! Path template rendering
//!
//! Stream paths may carry `{placeholder}` segments, e.g.
//! `/2026-01/marketing-solutions/advertisers/{id}/ads`. Placeholders are
//! filled from the [`Context`] a parent stream hands to its children.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Bytes escaped when a context value becomes one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Key-value data passed from a parent record to a child stream
///
/// Ordered so that its identity string is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, Value>);

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a value rendered as a path segment
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key).map(value_to_string)
    }

    /// Whether the context holds no values
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable identifier, e.g. `id=77`
    pub fn id(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={}", value_to_string(v)))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Convert to a JSON object
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Render a path template, failing on placeholders the context does not define
///
/// Each value is percent-encoded as a single path segment.
pub fn render(template: &str, ctx: &Context) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match ctx.get_string(name) {
            Some(value) => utf8_percent_encode(&value, PATH_SEGMENT).to_string(),
            None => {
                missing.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains placeholders
pub fn has_placeholders(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}

/// Extract all placeholder names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for substitution
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
