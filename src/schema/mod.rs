//! JSON Schema types and the embedded stream schemas
//!
//! Static streams load their schema from the files compiled in by
//! [`catalog`]; report streams build theirs from configuration.

mod catalog;
mod types;

pub use catalog::{load_schema, SCHEMA_FILES};
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};

#[cfg(test)]
mod tests;
