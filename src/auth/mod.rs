//! Authentication module
//!
//! Obtains bearer credentials with the OAuth2 client-credentials grant.
//!
//! The `Authenticator` caches the token for the whole run and refreshes it
//! once it is within 30 seconds of expiry. Refresh is single-writer: readers
//! share the cached token, and only one task performs the exchange.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{BearerToken, OAuthCredentials};
