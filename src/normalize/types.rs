//! Record normalizer strategies

use super::coerce::CoercionTable;
use crate::types::{JsonValue, Record};
use std::collections::BTreeSet;
use tracing::{trace, warn};

/// Outcome of normalizing one record
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// Emit the transformed record
    Emit(Record),
    /// Drop the record
    Suppressed,
}

impl Normalized {
    /// The emitted record, if any
    pub fn into_record(self) -> Option<Record> {
        match self {
            Normalized::Emit(record) => Some(record),
            Normalized::Suppressed => None,
        }
    }

    /// Whether the record was dropped
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Normalized::Suppressed)
    }
}

/// Per-stream record transformation, applied after a page is decoded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Normalizer {
    /// Emit records as returned
    #[default]
    Passthrough,

    /// Merge the `attributes` object into the top level
    Flatten,

    /// Flatten, then drop records whose `id` is outside the allow-list
    ///
    /// An empty allow-list keeps every record.
    FlattenScoped {
        /// Advertiser ids to keep
        allowed_ids: BTreeSet<String>,
    },

    /// Convert report fields using a coercion table
    Coerce(CoercionTable),
}

impl Normalizer {
    /// Flatten and scope to the given ids
    pub fn scoped<I, S>(allowed_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Normalizer::FlattenScoped {
            allowed_ids: allowed_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalize one raw record from `stream`
    pub fn normalize(&self, stream: &str, mut record: Record) -> Normalized {
        match self {
            Normalizer::Passthrough => Normalized::Emit(record),
            Normalizer::Flatten => {
                flatten_attributes(&mut record);
                Normalized::Emit(record)
            }
            Normalizer::FlattenScoped { allowed_ids } => {
                flatten_attributes(&mut record);
                if allowed_ids.is_empty() {
                    return Normalized::Emit(record);
                }

                let id = record.get("id").map(id_string).unwrap_or_default();
                if allowed_ids.contains(&id) {
                    Normalized::Emit(record)
                } else {
                    trace!(stream, id = %id, "Record outside advertiser scope");
                    Normalized::Suppressed
                }
            }
            Normalizer::Coerce(table) => {
                coerce_fields(stream, table, &mut record);
                Normalized::Emit(record)
            }
        }
    }
}

/// Move the keys of a nested `attributes` object to the top level
///
/// Attribute keys overwrite top-level keys of the same name. A
/// non-object `attributes` value is left in place.
pub fn flatten_attributes(record: &mut Record) {
    if !matches!(record.get("attributes"), Some(JsonValue::Object(_))) {
        return;
    }

    if let Some(JsonValue::Object(attributes)) = record.remove("attributes") {
        for (key, value) in attributes {
            record.insert(key, value);
        }
    }
}

fn coerce_fields(stream: &str, table: &CoercionTable, record: &mut Record) {
    for (field, value) in record.iter_mut() {
        let Some(coercion) = table.get(field) else {
            continue;
        };

        match coercion.apply(field, value) {
            Ok(converted) => *value = converted,
            Err(e) => {
                warn!(stream, field = %field, value = %value, error = %e, "Leaving value uncoerced");
            }
        }
    }
}

fn id_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
