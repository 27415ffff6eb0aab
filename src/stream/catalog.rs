//! The fixed Criteo resource streams

use super::types::{RequestBody, StreamDefinition};
use crate::config::TapConfig;
use crate::error::Result;
use crate::normalize::Normalizer;
use crate::pagination::PaginationConfig;
use crate::partition::ContextRule;
use crate::schema::load_schema;
use crate::types::Method;

/// Page size of the advertiser-scoped listing endpoints
pub const LISTING_PAGE_SIZE: u32 = 50;

/// Names of the static streams, in discovery order
pub const STATIC_STREAM_NAMES: &[&str] = &[
    "audiences",
    "advertisers",
    "campaigns",
    "ad_sets",
    "ads",
    "creatives",
];

/// Build the static streams for a configuration
pub fn static_streams(config: &TapConfig) -> Result<Vec<StreamDefinition>> {
    Ok(vec![
        StreamDefinition::builder(
            "audiences",
            Method::POST,
            "/2026-01/marketing-solutions/audiences/search",
        )
        .schema(load_schema("audience")?)
        .primary_keys(["id"])
        .body(RequestBody::AudienceSearch {
            advertiser_ids: config.advertiser_ids.clone(),
        })
        .normalizer(Normalizer::Flatten)
        .build()?,
        StreamDefinition::builder("advertisers", Method::GET, "/2026-01/advertisers/me")
            .schema(load_schema("advertiser")?)
            .primary_keys(["id"])
            .normalizer(Normalizer::scoped(config.advertiser_ids.iter().cloned()))
            .child_context(ContextRule::id())
            .build()?,
        StreamDefinition::builder(
            "campaigns",
            Method::POST,
            "/2026-01/marketing-solutions/campaigns/search",
        )
        .schema(load_schema("campaign")?)
        .primary_keys(["id"])
        .body(RequestBody::EmptyObject)
        .normalizer(Normalizer::Flatten)
        .build()?,
        StreamDefinition::builder(
            "ad_sets",
            Method::POST,
            "/2026-01/marketing-solutions/ad-sets/search",
        )
        .schema(load_schema("ad_set")?)
        .primary_keys(["id"])
        .body(RequestBody::EmptyObject)
        .normalizer(Normalizer::Flatten)
        .build()?,
        StreamDefinition::builder(
            "ads",
            Method::GET,
            "/2026-01/marketing-solutions/advertisers/{id}/ads",
        )
        .schema(load_schema("ad")?)
        .primary_keys(["id"])
        .parent("advertisers")
        .pagination(PaginationConfig::offset(LISTING_PAGE_SIZE))
        .normalizer(Normalizer::Flatten)
        .build()?,
        StreamDefinition::builder(
            "creatives",
            Method::GET,
            "/2026-01/marketing-solutions/advertisers/{id}/creatives",
        )
        .schema(load_schema("creative")?)
        .primary_keys(["id"])
        .parent("advertisers")
        .pagination(PaginationConfig::offset(LISTING_PAGE_SIZE))
        .normalizer(Normalizer::Flatten)
        .build()?,
    ])
}
