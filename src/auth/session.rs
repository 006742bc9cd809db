//! Identities and credentials that flow between the OAuth steps, the store
//! and the fetcher.

use crate::config::ShopDomain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an authenticated tenant (the platform user id).
///
/// Produced only by an [`Authenticator`](crate::auth::Authenticator); it is
/// the key under which the credential store keeps the tenant's connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wraps an already authenticated tenant identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An offline Admin API access token.
///
/// `Debug` is masked so the token never reaches a log line by accident.
/// There is deliberately no `Display` or `Serialize`.
///
/// # Example
///
/// ```rust
/// use shop_connect::AccessToken;
///
/// let token = AccessToken::new("shpat_0123");
/// assert_eq!(format!("{token:?}"), "AccessToken(*****)");
/// assert_eq!(token.expose(), "shpat_0123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token received from the token endpoint.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an outbound header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(*****)")
    }
}

/// What the fetcher needs to call the Admin API for one tenant.
#[derive(Clone, Debug)]
pub struct ShopCredentials {
    /// The shop the token was issued for.
    pub shop: ShopDomain,
    /// The offline access token.
    pub access_token: AccessToken,
}

// Verify credential types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopCredentials>();
    assert_send_sync::<TenantId>();
};
