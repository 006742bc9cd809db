//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the authorization code flow. From an
//! untrusted shop name it produces the Shopify authorization URL, the
//! redirect URI that URL carries, and a fresh state value.
//!
//! # Example
//!
//! ```rust
//! use shop_connect::{ShopConnectConfig, ApiKey, ApiSecretKey, HostUrl};
//! use shop_connect::auth::oauth::begin_auth;
//!
//! let config = ShopConnectConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .redirect_uri(HostUrl::new("https://myapp.example.com/auth/callback").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let result = begin_auth(&config, "test-shop", None).unwrap();
//! assert!(result.auth_url.starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
//! assert_eq!(result.redirect_uri, "https://myapp.example.com/auth/callback");
//! ```

use crate::auth::oauth::state::StateParam;
use crate::config::{HostUrl, ShopConnectConfig, ShopName};
use crate::error::{ConfigError, Error, Result};

/// Result of initiating OAuth authorization.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to send the merchant to.
    pub auth_url: String,

    /// The redirect URI embedded in `auth_url`.
    pub redirect_uri: String,

    /// The state generated for this attempt.
    ///
    /// Shopify echoes it on the callback. Record it (see
    /// [`PendingStates`](super::PendingStates)) and pass it to
    /// [`verify_callback`](super::verify_callback) so the callback is tied to
    /// this flow.
    pub state: StateParam,
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};

/// Builds the authorization URL for a shop.
///
/// `shop_name` is the bare subdomain supplied by the tenant. It must match
/// `^[a-zA-Z0-9][a-zA-Z0-9-]*$`; the authorization host is the lower-cased
/// name under `.myshopify.com`.
///
/// `redirect_override` is only honoured when the configuration allows
/// overrides. Otherwise it is ignored and the configured redirect URI is
/// used.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] if `shop_name` is malformed, or an allowed
///   override is not an absolute http(s) URL.
/// - [`Error::Configuration`] if no redirect URI is configured and no
///   override was accepted.
pub fn begin_auth(
    config: &ShopConnectConfig,
    shop_name: &str,
    redirect_override: Option<&str>,
) -> Result<BeginAuthResult> {
    let shop = ShopName::new(shop_name)
        .map_err(|e| Error::invalid("shopName", e.to_string()))?
        .to_shop_domain();

    let redirect_uri = resolve_redirect_uri(config, redirect_override)?;
    let state = StateParam::new();

    let params = [
        ("client_id", config.api_key().as_ref().to_string()),
        ("scope", config.scopes().to_string()),
        ("redirect_uri", redirect_uri.to_string()),
        ("state", state.to_string()),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    tracing::debug!(shop = %shop, redirect_uri = %redirect_uri, "built authorization url");

    Ok(BeginAuthResult {
        auth_url,
        redirect_uri: redirect_uri.to_string(),
        state,
    })
}

fn resolve_redirect_uri(
    config: &ShopConnectConfig,
    redirect_override: Option<&str>,
) -> Result<HostUrl> {
    let requested = redirect_override.map(str::trim).filter(|s| !s.is_empty());

    match requested {
        Some(uri) if config.allow_redirect_override() => {
            HostUrl::new(uri).map_err(|e| Error::invalid("redirectUri", e.to_string()))
        }
        Some(_) => {
            tracing::warn!("redirect URI override ignored; overrides are disabled");
            configured_redirect_uri(config)
        }
        None => configured_redirect_uri(config),
    }
}

fn configured_redirect_uri(config: &ShopConnectConfig) -> Result<HostUrl> {
    config
        .redirect_uri()
        .cloned()
        .ok_or(Error::Configuration(ConfigError::MissingRedirectUri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};
    use crate::error::ErrorKind;

    fn create_test_config(allow_override: bool) -> ShopConnectConfig {
        ShopConnectConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .redirect_uri(HostUrl::new("https://myapp.example.com/auth/callback").unwrap())
            .scopes("read_orders,read_products".parse().unwrap())
            .allow_redirect_override(allow_override)
            .build()
            .unwrap()
    }

    fn query_pairs(auth_url: &str) -> Vec<(String, String)> {
        url::Url::parse(auth_url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_begin_auth_builds_url_for_shop() {
        let config = create_test_config(false);
        let result = begin_auth(&config, "my-store", None).unwrap();

        let url = url::Url::parse(&result.auth_url).unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("my-store.myshopify.com"));
        assert_eq!(url.path(), "/admin/oauth/authorize");

        let pairs = query_pairs(&result.auth_url);
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["client_id", "scope", "redirect_uri", "state"]);
        assert_eq!(pairs[0].1, "test-api-key");
        assert_eq!(pairs[1].1, "read_orders,read_products");
        assert_eq!(pairs[2].1, "https://myapp.example.com/auth/callback");
        assert_eq!(pairs[3].1, result.state.as_ref());
    }

    #[test]
    fn test_begin_auth_encodes_values() {
        let config = create_test_config(false);
        let result = begin_auth(&config, "my-store", None).unwrap();

        assert!(result
            .auth_url
            .contains("redirect_uri=https%3A%2F%2Fmyapp.example.com%2Fauth%2Fcallback"));
        assert!(result.auth_url.contains("scope=read_orders%2Cread_products"));
    }

    #[test]
    fn test_begin_auth_lowercases_shop_host() {
        let config = create_test_config(false);
        let result = begin_auth(&config, "My-Store", None).unwrap();
        assert!(result
            .auth_url
            .starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
    }

    #[test]
    fn test_begin_auth_rejects_bad_shop_names() {
        let config = create_test_config(false);
        for bad in ["my-store.myshopify.com", "../evil", "", "evil.com/", "a b"] {
            let err = begin_auth(&config, bad, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidFormat, "{bad:?}");
        }
    }

    #[test]
    fn test_begin_auth_generates_fresh_state() {
        let config = create_test_config(false);
        let first = begin_auth(&config, "my-store", None).unwrap();
        let second = begin_auth(&config, "my-store", None).unwrap();
        assert_ne!(first.state, second.state);
    }

    #[test]
    fn test_override_ignored_when_disabled() {
        let config = create_test_config(false);
        let result = begin_auth(&config, "my-store", Some("https://evil.example/steal")).unwrap();
        assert_eq!(result.redirect_uri, "https://myapp.example.com/auth/callback");
        assert!(!result.auth_url.contains("evil.example"));
    }

    #[test]
    fn test_override_honoured_when_enabled() {
        let config = create_test_config(true);
        let result =
            begin_auth(&config, "my-store", Some("http://localhost:5173/callback")).unwrap();
        assert_eq!(result.redirect_uri, "http://localhost:5173/callback");

        let err = begin_auth(&config, "my-store", Some("javascript:alert(1)")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_empty_override_uses_configured_uri() {
        let config = create_test_config(true);
        let result = begin_auth(&config, "my-store", Some("  ")).unwrap();
        assert_eq!(result.redirect_uri, "https://myapp.example.com/auth/callback");
    }

    #[test]
    fn test_missing_redirect_uri_is_configuration_error() {
        let config = ShopConnectConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build()
            .unwrap();

        let err = begin_auth(&config, "my-store", None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);
        assert_eq!(err.status_code(), 500);
    }
}
