//! Bearer authentication of the service's own callers.
//!
//! Every endpoint acts on behalf of a tenant, identified from the bearer
//! token of the request. [`Authenticator`] is the seam: the HTTP layer only
//! ever sees a [`TenantId`] or [`Error::Unauthenticated`].
//!
//! [`JwtAuthenticator`] validates HS256 tokens issued by the hosted auth
//! platform and uses the `sub` claim as the tenant id.

use std::fmt;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::auth::TenantId;
use crate::error::{ConfigError, Error, Result};

/// Leeway for time-based claims, in seconds.
const JWT_LEEWAY_SECS: u64 = 10;

/// Resolves a bearer token to the tenant it belongs to.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticates `bearer` (the token without the `Bearer ` prefix).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] if the token is not valid.
    async fn authenticate(&self, bearer: &str) -> Result<TenantId>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Validates HS256 JWTs and returns their `sub` claim.
///
/// `exp` is required; `nbf` is checked when present. Both allow 10 seconds
/// of clock skew.
///
/// # Example
///
/// ```rust
/// use shop_connect::auth::JwtAuthenticator;
///
/// let authenticator = JwtAuthenticator::new("jwt-secret", Some("authenticated")).unwrap();
/// assert!(JwtAuthenticator::new("", None).is_err());
/// # drop(authenticator);
/// ```
#[derive(Clone)]
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    /// Creates an authenticator for tokens signed with `secret`.
    ///
    /// When `audience` is set, the `aud` claim must contain it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] if `secret` is empty.
    pub fn new(secret: &str, audience: Option<&str>) -> std::result::Result<Self, ConfigError> {
        if secret.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "AUTH_JWT_SECRET",
                reason: "must not be empty".to_string(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = JWT_LEEWAY_SECS;
        validation.validate_nbf = true;
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("key", &"*****")
            .field("aud", &self.validation.aud)
            .finish()
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, bearer: &str) -> Result<TenantId> {
        let data = decode::<Claims>(bearer, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            Error::Unauthenticated
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(Error::Unauthenticated);
        }
        Ok(TenantId::new(data.claims.sub))
    }
}
