//! HTTP client with retry and rate limiting
//!
//! Every call to the Criteo API goes through [`HttpClient`]:
//! - Automatic retries with configurable backoff on 429, 5xx, timeouts
//!   and connection failures
//! - Token-bucket rate limiting
//! - Bearer authentication, with one forced token refresh on a 401
//! - JSON response decoding

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{Authenticator, OAuthCredentials};
use crate::error::{Error, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport settings shared by every request
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Prefix for relative request paths
    pub base_url: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each later one
    pub initial_backoff: Duration,
    /// Ceiling for the retry delay
    pub max_backoff: Duration,
    /// Token bucket applied before each attempt; `None` disables it
    pub rate_limit: Option<RateLimiterConfig>,
    /// Sent as `User-Agent`
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
            rate_limit: Some(RateLimiterConfig::default()),
            user_agent: format!("tap-criteo/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Exponential backoff starting at `initial`, capped at `max`
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Query string and JSON body of one request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add several query parameters
    #[must_use]
    pub fn queries(mut self, params: HashMap<String, String>) -> Self {
        self.query.extend(params);
        self
    }

    /// Send `body` as JSON
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        })
    }

    /// Create a client that authenticates every request with a bearer token
    pub fn with_auth(config: HttpClientConfig, credentials: OAuthCredentials) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.authenticator = Some(Authenticator::with_client(
            credentials,
            client.client.clone(),
        ));
        Ok(client)
    }

    /// The authenticator, if one is configured
    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.authenticator.as_ref()
    }

    /// Send a request, retrying transient failures
    ///
    /// 429 waits for `Retry-After`; 5xx, timeouts and connection errors
    /// wait an exponential backoff. A 401 clears the cached token and is
    /// replayed once without consuming a retry.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
    ) -> Result<Response> {
        let full_url = self.build_url(url);
        let max_retries = self.config.max_retries;

        let mut attempt = 0;
        let mut refreshed_token = false;
        let mut last_error = None;

        while attempt <= max_retries {
            let can_retry = attempt < max_retries;
            let backoff = self.calculate_backoff(attempt);

            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self.client.request(method.clone(), &full_url);
            if !config.query.is_empty() {
                req = req.query(&config.query);
            }
            if let Some(body) = &config.body {
                req = req.json(body);
            }
            if let Some(auth) = &self.authenticator {
                req = auth.apply(req).await?;
            }

            let response = match req.send().await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    let timeout_ms = self.config.timeout.as_millis() as u64;
                    if !can_retry {
                        return Err(Error::Timeout { timeout_ms });
                    }
                    self.pause(&full_url, "timeout", attempt, backoff).await;
                    last_error = Some(Error::Timeout { timeout_ms });
                    attempt += 1;
                    continue;
                }
                Err(e) if e.is_connect() && can_retry => {
                    self.pause(&full_url, "connection error", attempt, backoff).await;
                    last_error = Some(Error::Http(e));
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(Error::Http(e)),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = extract_retry_after(&response);
                if !can_retry {
                    return Err(Error::RateLimited {
                        retry_after_seconds: retry_after,
                    });
                }
                let wait = Duration::from_secs(retry_after);
                self.pause(&full_url, "429", attempt, wait).await;
                attempt += 1;
                continue;
            }

            // Tokens can be revoked before their advertised expiry
            if status == StatusCode::UNAUTHORIZED && !refreshed_token {
                if let Some(auth) = &self.authenticator {
                    warn!(url = %full_url, "Unauthorized (401), refreshing access token");
                    auth.clear_cache().await;
                    refreshed_token = true;
                    continue;
                }
            }

            if is_retryable_status(status) && can_retry {
                self.pause(&full_url, status.as_str(), attempt, backoff).await;
                last_error = Some(Error::http_status(status.as_u16(), ""));
                attempt += 1;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::http_status(status.as_u16(), body));
            }

            debug!(%method, url = %full_url, "Request succeeded");
            return Ok(response);
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    async fn pause(&self, url: &str, reason: &str, attempt: u32, delay: Duration) {
        warn!(
            url,
            reason,
            attempt = attempt + 1,
            of = self.config.max_retries + 1,
            "Retrying in {delay:?}"
        );
        tokio::time::sleep(delay).await;
    }

    /// Make a request and decode the JSON response body
    ///
    /// An empty body decodes to `null`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, url, config).await?;
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { &text };
        Ok(serde_json::from_str(text)?)
    }

    /// Make a GET request and decode the JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request_json(Method::GET, url, &RequestConfig::default())
            .await
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Build full URL from path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    /// Retry delay after `attempt` failed attempts: doubling, capped
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = self
            .config
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Check if an HTTP status is retryable
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status.as_u16(),
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
