//! Validated newtype wrappers for configuration and request values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Shopify API key (the OAuth `client_id`).
///
/// # Example
///
/// ```rust
/// use shop_connect::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// The secret is both the OAuth `client_secret` and the HMAC key for
/// callback verification. Its `Debug` output is masked so it cannot leak
/// through logs.
///
/// # Example
///
/// ```rust
/// use shop_connect::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated, fully-qualified Shopify shop domain.
///
/// The whole string must match `^[a-z0-9][a-z0-9-]*\.myshopify\.com$`.
/// Nothing is trimmed, lower-cased or completed: a value that is not already
/// in canonical form is rejected. This is the unit of trust for every
/// outbound call, so look-alikes such as `shop.myshopify.com.evil.com` or
/// `MY_STORE.myshopify.com` never construct.
///
/// # Example
///
/// ```rust
/// use shop_connect::ShopDomain;
///
/// let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// assert!(ShopDomain::new("my-store").is_err());
/// assert!(ShopDomain::new("evil.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    /// The suffix every shop domain carries.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is not in
    /// canonical `name.myshopify.com` form.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into();

        let Some(label) = domain.strip_suffix(Self::SUFFIX) else {
            return Err(ConfigError::InvalidShopDomain { domain });
        };

        if !Self::is_valid_label(label) {
            return Err(ConfigError::InvalidShopDomain { domain });
        }

        Ok(Self {
            shop_name_end: label.len(),
            full_domain: domain,
        })
    }

    /// Returns the shop name portion of the domain.
    ///
    /// For `my-store.myshopify.com`, this returns `my-store`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    fn is_valid_label(label: &str) -> bool {
        let mut chars = label.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
            return false;
        }
        chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A tenant-supplied shop subdomain, such as `my-store`.
///
/// Must match `^[a-zA-Z0-9][a-zA-Z0-9-]*$`. Dots, slashes and an appended
/// `.myshopify.com` are all rejected, which keeps the caller from steering
/// the authorization URL to another host.
///
/// # Example
///
/// ```rust
/// use shop_connect::ShopName;
///
/// let name = ShopName::new("My-Store").unwrap();
/// assert_eq!(name.to_shop_domain().as_ref(), "my-store.myshopify.com");
///
/// assert!(ShopName::new("my-store.myshopify.com").is_err());
/// assert!(ShopName::new("../evil").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopName(String);

impl ShopName {
    /// Creates a new validated shop name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopName`] if the name is not a bare
    /// alphanumeric-and-hyphen subdomain.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');

        if !valid {
            return Err(ConfigError::InvalidShopName { name });
        }
        Ok(Self(name))
    }

    /// Returns the canonical shop domain for this name.
    ///
    /// Shopify hostnames are case-insensitive; the domain is lower-cased so
    /// it satisfies the [`ShopDomain`] invariant.
    #[must_use]
    pub fn to_shop_domain(&self) -> ShopDomain {
        let label = self.0.to_ascii_lowercase();
        ShopDomain {
            shop_name_end: label.len(),
            full_domain: format!("{label}{}", ShopDomain::SUFFIX),
        }
    }
}

impl AsRef<str> for ShopName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated absolute http(s) URL.
///
/// Used for the OAuth redirect URI and for the optional upstream host
/// override. The original string is preserved for display, so a configured
/// redirect URI is sent to Shopify byte-for-byte as configured.
///
/// # Example
///
/// ```rust
/// use shop_connect::HostUrl;
///
/// let url = HostUrl::new("https://myapp.example.com/auth/callback").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), Some("myapp.example.com"));
/// assert_eq!(url.origin(), "https://myapp.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl {
    raw: String,
    parsed: url::Url,
}

impl HostUrl {
    /// Creates a new validated URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the URL does not parse, is
    /// not http(s), or has no host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into().trim().to_string();

        let parsed =
            url::Url::parse(&raw).map_err(|_| ConfigError::InvalidHostUrl { url: raw.clone() })?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidHostUrl { url: raw });
        }

        Ok(Self { raw, parsed })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.parsed.scheme()
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.parsed.host_str()
    }

    /// Returns `scheme://host[:port]` without a trailing slash.
    #[must_use]
    pub fn origin(&self) -> String {
        self.parsed.origin().ascii_serialization()
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for HostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty_string() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(ApiKey::new("   "), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_secret_key_masks_value_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "ApiSecretKey(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_shop_domain_accepts_canonical_form() {
        let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
        assert_eq!(domain.shop_name(), "my-store");

        assert!(ShopDomain::new("0shop.myshopify.com").is_ok());
        assert!(ShopDomain::new("shop-.myshopify.com").is_ok());
    }

    #[test]
    fn test_shop_domain_rejects_look_alikes() {
        for bad in [
            "",
            "evil.com",
            "shop.myshopify.com.evil.com",
            "MY_STORE.myshopify.com",
            "My-Store.myshopify.com",
            "my-store",
            ".myshopify.com",
            "-shop.myshopify.com",
            "a.b.myshopify.com",
            "shop.myshopify.com ",
            " shop.myshopify.com",
            "shop.myshopify.com/",
            "shop.myshopify.com:443",
            "shop.myshopifyxcom",
        ] {
            assert!(ShopDomain::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_shop_name_validation() {
        assert!(ShopName::new("my-store").is_ok());
        assert!(ShopName::new("Store42").is_ok());

        for bad in [
            "",
            "-store",
            "my-store.myshopify.com",
            "../evil",
            "evil/path",
            "my store",
            "my_store",
            "evil.com#",
            "shop?x=1",
        ] {
            assert!(ShopName::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_shop_name_lowercases_domain() {
        let domain = ShopName::new("MyStore").unwrap().to_shop_domain();
        assert_eq!(domain.as_ref(), "mystore.myshopify.com");
        assert_eq!(domain.shop_name(), "mystore");
        assert!(ShopDomain::new(domain.as_ref()).is_ok());
    }

    #[test]
    fn test_host_url_validates_format() {
        let url = HostUrl::new("https://myapp.example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_name(), Some("myapp.example.com"));
        assert_eq!(url.as_ref(), "https://myapp.example.com");

        let url = HostUrl::new("http://localhost:3000/callback").unwrap();
        assert_eq!(url.host_name(), Some("localhost"));
        assert_eq!(url.origin(), "http://localhost:3000");
    }

    #[test]
    fn test_host_url_rejects_invalid() {
        assert!(HostUrl::new("myapp.example.com").is_err());
        assert!(HostUrl::new("https://").is_err());
        assert!(HostUrl::new("://example.com").is_err());
        assert!(HostUrl::new("javascript:alert(1)").is_err());
        assert!(HostUrl::new("ftp://files.example.com").is_err());
    }

    #[test]
    fn test_shop_domain_serde_round_trip_validates() {
        let domain = ShopDomain::new("my-store.myshopify.com").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, r#""my-store.myshopify.com""#);

        let result: Result<ShopDomain, _> = serde_json::from_str(r#""evil.com""#);
        assert!(result.is_err());
    }
}
