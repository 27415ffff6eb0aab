//! HTTP transport
//!
//! Provides the HTTP client with retry, rate limiting, exponential backoff
//! and bearer authentication.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
