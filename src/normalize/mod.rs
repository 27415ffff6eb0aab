//! Record normalization
//!
//! Runs between decoding a page and emitting its records:
//! - **Flattening**: Criteo wraps resource fields in an `attributes`
//!   object; they are lifted to the top level
//! - **Scoping**: the advertisers stream keeps only configured advertisers
//! - **Coercion**: report cells are converted to their schema types
//!
//! Coercion is lenient. A value that cannot be converted is emitted as
//! returned and a warning is logged.

mod coerce;
mod types;

pub use coerce::{Coercion, CoercionTable};
pub use types::{flatten_attributes, Normalized, Normalizer};

#[cfg(test)]
mod tests;
