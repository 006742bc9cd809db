//! Configuration for the connection service.
//!
//! All settings live in one immutable [`ShopConnectConfig`] that is built
//! once at startup and passed explicitly to every operation. Nothing reads
//! the environment after construction.
//!
//! # Overview
//!
//! - [`ShopConnectConfig`]: the settings shared by the OAuth flow, the HTTP
//!   client and the HTTP surface
//! - [`ShopConnectConfigBuilder`]: a builder for constructing it in code
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`ShopName`], [`HostUrl`]:
//!   validated newtypes
//! - [`ApiVersion`]: the Admin API version to call
//!
//! # Example
//!
//! ```rust
//! use shop_connect::{ShopConnectConfig, ApiKey, ApiSecretKey, ApiVersion, HostUrl};
//!
//! let config = ShopConnectConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .redirect_uri(HostUrl::new("https://myapp.example.com/auth/callback").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.scopes().to_string(), "read_orders");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain, ShopName};
pub use version::ApiVersion;

use std::time::Duration;

use crate::auth::AuthScopes;
use crate::error::ConfigError;
use crate::rest::PageHostPolicy;

/// Default OAuth scopes requested when none are configured.
pub const DEFAULT_SCOPES: &str = "read_orders";

/// Default CORS origin when `ALLOWED_ORIGIN` is unset.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://yourdomain.com";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FETCH_TRIES: u32 = 3;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Configuration for the connection service.
///
/// # Thread Safety
///
/// `ShopConnectConfig` is `Clone`, `Send`, and `Sync`; the server keeps one
/// instance behind an `Arc`.
///
/// # Key Rotation
///
/// When `old_api_secret_key` is set, callback signatures are accepted if
/// they verify under either secret, primary first. Token exchange always
/// uses the primary secret.
#[derive(Clone, Debug)]
pub struct ShopConnectConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    redirect_uri: Option<HostUrl>,
    allow_redirect_override: bool,
    api_version: ApiVersion,
    api_host: Option<HostUrl>,
    allowed_origin: String,
    request_timeout: Duration,
    fetch_tries: u32,
    retry_backoff: Duration,
    page_host_policy: PageHostPolicy,
    user_agent_prefix: Option<String>,
}

impl ShopConnectConfig {
    /// Creates a new builder for constructing a `ShopConnectConfig`.
    #[must_use]
    pub fn builder() -> ShopConnectConfigBuilder {
        ShopConnectConfigBuilder::new()
    }

    /// Reads the configuration from process environment variables.
    ///
    /// See [`ShopConnectConfig::from_lookup`] for the variables consulted.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or any
    /// value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SHOPIFY_API_KEY` | required |
    /// | `SHOPIFY_API_SECRET_KEY` | required |
    /// | `SHOPIFY_OLD_API_SECRET_KEY` | none |
    /// | `SHOPIFY_REDIRECT_URI` | none |
    /// | `SHOPIFY_SCOPES` | `read_orders` |
    /// | `SHOPIFY_API_VERSION` | latest |
    /// | `SHOPIFY_ALLOW_REDIRECT_OVERRIDE` | `false` |
    /// | `SHOPIFY_API_HOST` | none |
    /// | `ALLOWED_ORIGIN` | `https://yourdomain.com` |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30` |
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or any
    /// value fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("SHOPIFY_API_KEY").ok_or(ConfigError::MissingRequiredField {
            field: "SHOPIFY_API_KEY",
        })?;
        let api_secret_key =
            get("SHOPIFY_API_SECRET_KEY").ok_or(ConfigError::MissingRequiredField {
                field: "SHOPIFY_API_SECRET_KEY",
            })?;

        let mut builder = Self::builder()
            .api_key(ApiKey::new(api_key)?)
            .api_secret_key(ApiSecretKey::new(api_secret_key)?);

        if let Some(old) = get("SHOPIFY_OLD_API_SECRET_KEY") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(old)?);
        }
        if let Some(uri) = get("SHOPIFY_REDIRECT_URI") {
            builder = builder.redirect_uri(HostUrl::new(uri)?);
        }
        if let Some(scopes) = get("SHOPIFY_SCOPES") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(version) = get("SHOPIFY_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(flag) = get("SHOPIFY_ALLOW_REDIRECT_OVERRIDE") {
            builder = builder
                .allow_redirect_override(parse_bool("SHOPIFY_ALLOW_REDIRECT_OVERRIDE", &flag)?);
        }
        if let Some(host) = get("SHOPIFY_API_HOST") {
            builder = builder.api_host(HostUrl::new(host)?);
        }
        if let Some(origin) = get("ALLOWED_ORIGIN") {
            builder = builder.allowed_origin(origin);
        }
        if let Some(secs) = get("UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidSetting {
                    field: "UPSTREAM_TIMEOUT_SECS",
                    reason: e.to_string(),
                })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if configured.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the OAuth scopes requested during authorization.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the configured OAuth redirect URI, if any.
    #[must_use]
    pub const fn redirect_uri(&self) -> Option<&HostUrl> {
        self.redirect_uri.as_ref()
    }

    /// Returns whether callers may supply their own redirect URI.
    #[must_use]
    pub const fn allow_redirect_override(&self) -> bool {
        self.allow_redirect_override
    }

    /// Returns the Admin API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the upstream host override, if any.
    ///
    /// When set, outbound requests are sent to this origin with the shop
    /// domain in the `Host` header instead of to `https://<shop>`.
    #[must_use]
    pub const fn api_host(&self) -> Option<&HostUrl> {
        self.api_host.as_ref()
    }

    /// Returns the CORS origin, either an origin URL or `*`.
    #[must_use]
    pub fn allowed_origin(&self) -> &str {
        &self.allowed_origin
    }

    /// Returns the timeout applied to every outbound request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns how many attempts a resource GET may make.
    #[must_use]
    pub const fn fetch_tries(&self) -> u32 {
        self.fetch_tries
    }

    /// Returns the base delay between resource GET attempts.
    #[must_use]
    pub const fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Returns which hosts a follow-up page URL may target.
    #[must_use]
    pub const fn page_host_policy(&self) -> PageHostPolicy {
        self.page_host_policy
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ShopConnectConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ShopConnectConfig>();
};

fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidSetting {
            field,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

/// Builder for constructing [`ShopConnectConfig`] instances.
///
/// Required fields are `api_key` and `api_secret_key`.
///
/// # Defaults
///
/// - `scopes`: `read_orders`
/// - `redirect_uri`: `None`
/// - `allow_redirect_override`: `false`
/// - `api_version`: latest stable version
/// - `api_host`: `None`
/// - `allowed_origin`: `https://yourdomain.com`
/// - `request_timeout`: 30 seconds
/// - `fetch_tries`: 3
/// - `retry_backoff`: 500 milliseconds
/// - `page_host_policy`: [`PageHostPolicy::ExactShop`]
#[derive(Debug, Default)]
pub struct ShopConnectConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    redirect_uri: Option<HostUrl>,
    allow_redirect_override: Option<bool>,
    api_version: Option<ApiVersion>,
    api_host: Option<HostUrl>,
    allowed_origin: Option<String>,
    request_timeout: Option<Duration>,
    fetch_tries: Option<u32>,
    retry_backoff: Option<Duration>,
    page_host_policy: Option<PageHostPolicy>,
    user_agent_prefix: Option<String>,
}

impl ShopConnectConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key for rotation.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the OAuth redirect URI.
    #[must_use]
    pub fn redirect_uri(mut self, uri: HostUrl) -> Self {
        self.redirect_uri = Some(uri);
        self
    }

    /// Allows callers to supply their own redirect URI (local development).
    #[must_use]
    pub const fn allow_redirect_override(mut self, allow: bool) -> Self {
        self.allow_redirect_override = Some(allow);
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Routes outbound requests through another origin (proxy or mock).
    #[must_use]
    pub fn api_host(mut self, host: HostUrl) -> Self {
        self.api_host = Some(host);
        self
    }

    /// Sets the CORS origin. Use `*` to allow any origin.
    #[must_use]
    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = Some(origin.into());
        self
    }

    /// Sets the outbound request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets how many attempts a resource GET may make.
    #[must_use]
    pub const fn fetch_tries(mut self, tries: u32) -> Self {
        self.fetch_tries = Some(tries);
        self
    }

    /// Sets the base delay between resource GET attempts.
    #[must_use]
    pub const fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    /// Sets which hosts a follow-up page URL may target.
    #[must_use]
    pub const fn page_host_policy(mut self, policy: PageHostPolicy) -> Self {
        self.page_host_policy = Some(policy);
        self
    }

    /// Sets the user agent prefix for outbound requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ShopConnectConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` or
    /// `api_secret_key` are not set, [`ConfigError::InvalidHostUrl`] if the
    /// allowed origin is neither `*` nor an http(s) URL, and
    /// [`ConfigError::InvalidSetting`] for a zero timeout or zero tries.
    pub fn build(self) -> Result<ShopConnectConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;

        let scopes = match self.scopes {
            Some(scopes) if !scopes.is_empty() => scopes,
            _ => DEFAULT_SCOPES.parse()?,
        };

        let allowed_origin = match self.allowed_origin {
            None => DEFAULT_ALLOWED_ORIGIN.to_string(),
            Some(origin) if origin.trim() == "*" => "*".to_string(),
            Some(origin) => HostUrl::new(origin)?.origin(),
        };

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidSetting {
                field: "request_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }

        let fetch_tries = self.fetch_tries.unwrap_or(DEFAULT_FETCH_TRIES);
        if fetch_tries == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "fetch_tries",
                reason: "at least one attempt is required".to_string(),
            });
        }

        Ok(ShopConnectConfig {
            api_key,
            api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes,
            redirect_uri: self.redirect_uri,
            allow_redirect_override: self.allow_redirect_override.unwrap_or(false),
            api_version: self.api_version.unwrap_or_else(ApiVersion::latest),
            api_host: self.api_host,
            allowed_origin,
            request_timeout,
            fetch_tries,
            retry_backoff: self.retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF),
            page_host_policy: self.page_host_policy.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
