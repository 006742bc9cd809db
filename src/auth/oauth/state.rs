//! OAuth `state` parameter.
//!
//! The state is an opaque random token issued with each authorization URL.
//! [`PendingStates`] remembers the last state issued to each tenant so the
//! callback can be tied to the flow that tenant started. The HMAC only
//! proves Shopify sent the parameters, not who asked for them.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::auth::TenantId;

/// OAuth state parameter for CSRF protection.
///
/// Generated from the thread-local CSPRNG. Each call to
/// [`StateParam::new`] yields a fresh value.
///
/// # Example
///
/// ```rust
/// use shop_connect::auth::oauth::StateParam;
///
/// let state = StateParam::new();
/// assert_eq!(state.as_ref().len(), 32);
/// assert!(state.matches(state.as_ref()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam(String);

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    const NONCE_LENGTH: usize = 32;

    /// Creates a new state with a 32-character alphanumeric nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();
        Self(nonce)
    }

    /// Wraps a state value received back from a callback.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Compares against a received value in constant time.
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        self.0.as_bytes().ct_eq(received.as_bytes()).into()
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The most recent state issued to each tenant.
///
/// Process-local: after a restart, or on another replica, no state is
/// pending and callbacks are verified by shop and HMAC alone.
///
/// # Example
///
/// ```rust
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use shop_connect::auth::oauth::{PendingStates, StateParam};
/// use shop_connect::TenantId;
///
/// let pending = PendingStates::new();
/// let tenant = TenantId::new("user-1");
/// let state = StateParam::new();
///
/// pending.issue(&tenant, state.clone()).await;
/// assert_eq!(pending.expected(&tenant).await, Some(state));
///
/// pending.clear(&tenant).await;
/// assert_eq!(pending.expected(&tenant).await, None);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PendingStates {
    issued: RwLock<HashMap<TenantId, StateParam>>,
}

impl PendingStates {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `state` for `tenant`, replacing any earlier one.
    pub async fn issue(&self, tenant: &TenantId, state: StateParam) {
        self.issued.write().await.insert(tenant.clone(), state);
    }

    /// Returns the state `tenant`'s callback must echo, if any.
    pub async fn expected(&self, tenant: &TenantId) -> Option<StateParam> {
        self.issued.read().await.get(tenant).cloned()
    }

    /// Forgets the state of a completed flow.
    pub async fn clear(&self, tenant: &TenantId) {
        self.issued.write().await.remove(tenant);
    }
}
