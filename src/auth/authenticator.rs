//! Authenticator implementation
//!
//! Handles applying the bearer token to requests and managing token refresh.

use super::types::{BearerToken, OAuthCredentials};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Client-credentials settings
    credentials: OAuthCredentials,
    /// Cached token, shared by every request in the run
    cached_token: Arc<RwLock<Option<BearerToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given credentials
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client: Client::new(),
        }
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(credentials: OAuthCredentials, http_client: Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.get_credential().await?;
        Ok(req.bearer_auth(token.token))
    }

    /// Get a valid token, refreshing if necessary
    pub async fn get_credential(&self) -> Result<BearerToken> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.clone());
            }
        }

        let new_token = self.fetch_client_credentials().await?;
        *cached = Some(new_token.clone());

        Ok(new_token)
    }

    /// Fetch a token using the client credentials flow
    async fn fetch_client_credentials(&self) -> Result<BearerToken> {
        debug!(token_url = %self.credentials.token_url, "Requesting access token");

        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| Error::OAuth2 {
            message: format!("Malformed token response: {e}"),
        })?;
        Ok(token_response.into_bearer_token())
    }

    /// Clear the cached token (forces a refresh on next use)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the configured credentials
    pub fn credentials(&self) -> &OAuthCredentials {
        &self.credentials
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_bearer_token(self) -> BearerToken {
        match self.expires_in {
            Some(secs) => BearerToken::expires_in(self.access_token, secs),
            None => BearerToken::new(self.access_token, None),
        }
    }
}
