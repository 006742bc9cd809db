//! Process-local credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, TenantProfile};
use crate::auth::{AccessToken, TenantId};
use crate::config::ShopDomain;

/// A [`CredentialStore`] kept in memory.
///
/// Contents are lost on restart.
///
/// # Example
///
/// ```rust
/// use shop_connect::store::{CredentialStore, InMemoryCredentialStore};
/// use shop_connect::{AccessToken, ShopDomain, TenantId};
///
/// # block_on(async {
/// let store = InMemoryCredentialStore::new();
/// let tenant = TenantId::new("user-1");
/// let shop = ShopDomain::new("my-store.myshopify.com").unwrap();
///
/// store.upsert(&tenant, &shop, &AccessToken::new("shpat_1")).await.unwrap();
/// let profile = store.get(&tenant).await.unwrap();
/// assert_eq!(profile.shop_domain, shop);
/// # });
/// # fn block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    profiles: RwLock<HashMap<TenantId, TenantProfile>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored connections.
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn upsert(
        &self,
        tenant_id: &TenantId,
        shop_domain: &ShopDomain,
        access_token: &AccessToken,
    ) -> Result<(), StoreError> {
        let profile = TenantProfile {
            tenant_id: tenant_id.clone(),
            shop_domain: shop_domain.clone(),
            access_token: access_token.clone(),
            updated_at: Utc::now(),
        };
        self.profiles
            .write()
            .await
            .insert(tenant_id.clone(), profile);
        Ok(())
    }

    async fn get(&self, tenant_id: &TenantId) -> Result<TenantProfile, StoreError> {
        self.profiles
            .read()
            .await
            .get(tenant_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    fn shop(name: &str) -> ShopDomain {
        ShopDomain::new(format!("{name}.myshopify.com")).unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_tenant_is_not_found() {
        let store = InMemoryCredentialStore::new();
        let err = store.get(&TenantId::new("nobody")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert_eq!(Error::from(err).kind(), ErrorKind::ProfileNotFound);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_previous_connection() {
        let store = InMemoryCredentialStore::new();
        let tenant = TenantId::new("user-1");

        store
            .upsert(&tenant, &shop("first"), &AccessToken::new("token-1"))
            .await
            .unwrap();
        store
            .upsert(&tenant, &shop("second"), &AccessToken::new("token-2"))
            .await
            .unwrap();

        let profile = store.get(&tenant).await.unwrap();
        assert_eq!(profile.shop_domain, shop("second"));
        assert_eq!(profile.access_token.expose(), "token-2");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let store = InMemoryCredentialStore::new();
        store
            .upsert(&TenantId::new("a"), &shop("shop-a"), &AccessToken::new("ta"))
            .await
            .unwrap();

        assert!(store.get(&TenantId::new("b")).await.is_err());
        let credentials = store.get(&TenantId::new("a")).await.unwrap().credentials();
        assert_eq!(credentials.shop, shop("shop-a"));
    }
}
