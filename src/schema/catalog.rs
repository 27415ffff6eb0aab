//! Schemas of the static Criteo streams
//!
//! The JSON Schema files live under `schemas/` and are compiled into the
//! binary. They describe records after attribute flattening.

use super::types::JsonSchema;
use crate::error::{Error, Result};

const ADVERTISER: &str = include_str!("../../schemas/advertiser.json");
const AUDIENCE: &str = include_str!("../../schemas/audience.json");
const CAMPAIGN: &str = include_str!("../../schemas/campaign.json");
const AD_SET: &str = include_str!("../../schemas/ad_set.json");
const AD: &str = include_str!("../../schemas/ad.json");
const CREATIVE: &str = include_str!("../../schemas/creative.json");

/// Schema file name (without extension) to embedded contents
pub const SCHEMA_FILES: &[(&str, &str)] = &[
    ("advertiser", ADVERTISER),
    ("audience", AUDIENCE),
    ("campaign", CAMPAIGN),
    ("ad_set", AD_SET),
    ("ad", AD),
    ("creative", CREATIVE),
];

/// Load an embedded schema by file name, e.g. `"ad_set"`
pub fn load_schema(name: &str) -> Result<JsonSchema> {
    let (_, contents) = SCHEMA_FILES
        .iter()
        .find(|(file, _)| *file == name)
        .ok_or_else(|| Error::config(format!("No embedded schema named '{name}'")))?;

    JsonSchema::from_json_str(contents)
        .map_err(|e| Error::config(format!("Embedded schema '{name}' is invalid: {e}")))
}
