//! OAuth callback verification and completion.
//!
//! A callback is handled in stages, each terminal on failure:
//!
//! 1. [`CallbackParams`] extracts `code`, `shop` and `hmac` and keeps every
//!    other parameter for signing.
//! 2. [`verify_callback`] checks the shop domain, then the HMAC, then the
//!    echoed `state` against the one issued for the flow.
//! 3. [`complete_callback`] exchanges the code and persists the token.
//!
//! Only [`verify_callback`] can produce a [`VerifiedCallback`], and
//! [`exchange_code`](super::exchange_code) only accepts one, so a token is
//! never requested for an unverified callback.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::auth::oauth::hmac::{canonical_message, verify_with_config, HMAC_PARAM};
use crate::auth::oauth::state::StateParam;
use crate::auth::oauth::token_exchange::exchange_code;
use crate::auth::TenantId;
use crate::clients::HttpClient;
use crate::config::{ShopConnectConfig, ShopDomain};
use crate::error::{Error, Result};
use crate::store::CredentialStore;

const STATE_PARAM: &str = "state";

/// Parameters received on the OAuth callback.
///
/// Values are kept exactly as received; they are never re-encoded, because
/// the signature covers the raw values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackParams {
    code: String,
    shop: String,
    hmac: String,
    extra: BTreeMap<String, String>,
}

impl CallbackParams {
    /// Parses a flat JSON object of callback parameters.
    ///
    /// Non-string values of extra parameters are rendered as JSON text
    /// (`123`, `true`, `null`).
    ///
    /// # Errors
    ///
    /// - [`Error::MissingParameter`] if `code`, `shop` or `hmac` is absent
    ///   or empty.
    /// - [`Error::InvalidFormat`] if one of them is not a string.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shop_connect::auth::oauth::CallbackParams;
    /// use serde_json::json;
    ///
    /// let body = json!({
    ///     "code": "abc",
    ///     "shop": "my-store.myshopify.com",
    ///     "hmac": "00ff",
    ///     "timestamp": 1700000000,
    /// });
    /// let params = CallbackParams::from_map(body.as_object().unwrap().clone()).unwrap();
    /// assert_eq!(params.code(), "abc");
    /// assert_eq!(params.extra().get("timestamp").map(String::as_str), Some("1700000000"));
    /// ```
    pub fn from_map(map: serde_json::Map<String, Value>) -> Result<Self> {
        let mut code = None;
        let mut shop = None;
        let mut hmac = None;
        let mut extra = BTreeMap::new();

        for (key, value) in map {
            match key.as_str() {
                "code" => code = Some(required_string("code", value)?),
                "shop" => shop = Some(required_string("shop", value)?),
                HMAC_PARAM => hmac = Some(required_string(HMAC_PARAM, value)?),
                _ => {
                    extra.insert(key, render_value(value));
                }
            }
        }

        Self::assemble(code, shop, hmac, extra)
    }

    fn assemble(
        code: Option<String>,
        shop: Option<String>,
        hmac: Option<String>,
        extra: BTreeMap<String, String>,
    ) -> Result<Self> {
        let present = |name: &str, value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::MissingParameter {
                    name: name.to_string(),
                })
        };

        Ok(Self {
            code: present("code", code)?,
            shop: present("shop", shop)?,
            hmac: present(HMAC_PARAM, hmac)?,
            extra,
        })
    }

    /// Returns the authorization code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the shop as received (unvalidated).
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.shop
    }

    /// Returns the received hex signature.
    #[must_use]
    pub fn hmac(&self) -> &str {
        &self.hmac
    }

    /// Returns the echoed `state`, if present.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.extra.get(STATE_PARAM).map(String::as_str)
    }

    /// Returns the parameters other than `code`, `shop` and `hmac`.
    #[must_use]
    pub const fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Returns the message the signature must cover.
    #[must_use]
    pub fn signable_message(&self) -> String {
        let fixed = [("code", self.code.as_str()), ("shop", self.shop.as_str())];
        canonical_message(
            fixed
                .into_iter()
                .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        )
    }
}

fn required_string(name: &'static str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        _ => Err(Error::invalid(name, "expected a string")),
    }
}

fn render_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// A callback whose shop and signature have been verified.
#[derive(Clone, Debug)]
pub struct VerifiedCallback {
    code: String,
    shop: ShopDomain,
}

impl VerifiedCallback {
    /// Returns the authorization code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the verified shop domain.
    #[must_use]
    pub const fn shop(&self) -> &ShopDomain {
        &self.shop
    }
}

/// Verifies the shop domain, HMAC and state of a callback.
///
/// `expected_state` is the state issued when the flow began. When given,
/// the signed `state` parameter must equal it.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] if `shop` is not a canonical
///   `name.myshopify.com` domain, or `state` is missing or differs from
///   `expected_state`.
/// - [`Error::HmacVerificationFailed`] if the signature does not verify
///   under the configured secret(s) or is not valid hex.
///
/// # Example
///
/// ```rust
/// use shop_connect::auth::oauth::hmac::compute_signature;
/// use shop_connect::auth::oauth::{verify_callback, CallbackParams};
/// use shop_connect::{ApiKey, ApiSecretKey, ShopConnectConfig};
///
/// let config = ShopConnectConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .build()
///     .unwrap();
///
/// let hmac = compute_signature("code=abc&shop=my-store.myshopify.com", "secret");
/// let body = serde_json::json!({
///     "code": "abc",
///     "shop": "my-store.myshopify.com",
///     "hmac": hmac,
/// });
/// let params = CallbackParams::from_map(body.as_object().unwrap().clone()).unwrap();
///
/// let verified = verify_callback(&config, &params, None).unwrap();
/// assert_eq!(verified.shop().as_ref(), "my-store.myshopify.com");
/// ```
pub fn verify_callback(
    config: &ShopConnectConfig,
    params: &CallbackParams,
    expected_state: Option<&StateParam>,
) -> Result<VerifiedCallback> {
    let shop =
        ShopDomain::new(params.shop()).map_err(|e| Error::invalid("shop", e.to_string()))?;

    let message = params.signable_message();
    if !verify_with_config(&message, params.hmac(), config) {
        tracing::warn!(shop = %shop, "callback hmac verification failed");
        return Err(Error::HmacVerificationFailed);
    }

    if let Some(expected) = expected_state {
        if !params.state().is_some_and(|received| expected.matches(received)) {
            tracing::warn!(shop = %shop, "callback state does not match the issued state");
            return Err(Error::invalid(STATE_PARAM, "does not match the issued state"));
        }
    }

    Ok(VerifiedCallback {
        code: params.code().to_string(),
        shop,
    })
}

/// Verifies a callback, exchanges its code and stores the token.
///
/// This is the only path that persists an access token. Nothing is written
/// unless verification and the exchange both succeed.
///
/// `expected_state` is forwarded to [`verify_callback`].
///
/// # Errors
///
/// Any error from [`verify_callback`], [`exchange_code`], or the store
/// (`StoreUnavailable`).
#[tracing::instrument(skip_all, fields(tenant = %tenant, shop = %params.shop()))]
pub async fn complete_callback(
    http: &HttpClient,
    config: &ShopConnectConfig,
    store: &dyn CredentialStore,
    tenant: &TenantId,
    params: &CallbackParams,
    expected_state: Option<&StateParam>,
) -> Result<ShopDomain> {
    let verified = verify_callback(config, params, expected_state)?;
    let token = exchange_code(http, config, &verified).await?;

    store.upsert(tenant, verified.shop(), &token).await?;
    tracing::info!("shop connected");

    Ok(verified.shop)
}
