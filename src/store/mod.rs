//! Tenant credential persistence.
//!
//! The service never keeps tokens itself. It writes through a
//! [`CredentialStore`] after a successful token exchange and reads through
//! it before fetching orders. Production deployments plug in their own
//! database-backed implementation; [`InMemoryCredentialStore`] backs tests
//! and local development.

mod memory;

pub use memory::InMemoryCredentialStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::auth::{AccessToken, ShopCredentials, TenantId};
use crate::config::ShopDomain;
use crate::error::Error;

/// A tenant's stored Shopify connection.
#[derive(Clone, Debug)]
pub struct TenantProfile {
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// The connected shop.
    pub shop_domain: ShopDomain,
    /// The offline access token for the shop.
    pub access_token: AccessToken,
    /// When the connection was last written.
    pub updated_at: DateTime<Utc>,
}

impl TenantProfile {
    /// Returns the credentials needed to call the shop.
    #[must_use]
    pub fn credentials(&self) -> ShopCredentials {
        ShopCredentials {
            shop: self.shop_domain.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Errors reported by a [`CredentialStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The tenant has no stored connection.
    #[error("no stored connection for tenant")]
    NotFound,

    /// The backing store failed.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::ProfileNotFound,
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}

/// Key-value persistence for tenant connections.
///
/// `upsert` overwrites any previous connection for the tenant; concurrent
/// writers for one tenant resolve as last writer wins.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Stores or replaces the tenant's connection.
    async fn upsert(
        &self,
        tenant_id: &TenantId,
        shop_domain: &ShopDomain,
        access_token: &AccessToken,
    ) -> Result<(), StoreError>;

    /// Loads the tenant's connection.
    async fn get(&self, tenant_id: &TenantId) -> Result<TenantProfile, StoreError>;
}
