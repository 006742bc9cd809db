//! HMAC verification for Shopify OAuth callbacks.
//!
//! Shopify signs the callback parameters with the app's API secret. The
//! signed message is every parameter except `hmac`, sorted by key, written
//! as `key=value` and joined with `&`. Values are used exactly as received,
//! without re-encoding.
//!
//! # Security
//!
//! The received signature is hex-decoded and compared to the computed MAC
//! in constant time. A malformed hex string is treated exactly like a
//! mismatch. With key rotation configured, the previous secret is tried
//! after the primary one.
//!
//! # Example
//!
//! ```rust
//! use shop_connect::auth::oauth::hmac::{canonical_message, compute_signature, verify_signature};
//!
//! let message = canonical_message([
//!     ("shop", "my-store.myshopify.com"),
//!     ("code", "abc123"),
//!     ("hmac", "ignored"),
//! ]);
//! assert_eq!(message, "code=abc123&shop=my-store.myshopify.com");
//!
//! let signature = compute_signature(&message, "my-api-secret");
//! assert!(verify_signature(&message, &signature, "my-api-secret"));
//! assert!(!verify_signature(&message, &signature, "another-secret"));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::ShopConnectConfig;

type HmacSha256 = Hmac<Sha256>;

/// Name of the parameter that carries the signature.
pub const HMAC_PARAM: &str = "hmac";

/// Builds the message Shopify signs from callback parameters.
///
/// The `hmac` parameter is excluded. Keys are ordered by byte value.
#[must_use]
pub fn canonical_message<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = params
        .into_iter()
        .filter(|(key, _)| *key != HMAC_PARAM)
        .collect();
    pairs.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()).then(a.1.cmp(b.1)));

    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn mac_bytes(message: &str, secret: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Computes the lowercase hex HMAC-SHA256 of `message`.
///
/// ```rust
/// use shop_connect::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    hex::encode(mac_bytes(message, secret))
}

/// Verifies a hex-encoded signature against `message` under `secret`.
#[must_use]
#[allow(clippy::missing_panics_doc)]
pub fn verify_signature(message: &str, received_hex: &str, secret: &str) -> bool {
    let Ok(received) = hex::decode(received_hex) else {
        return false;
    };
    let expected = mac_bytes(message, secret);
    expected.ct_eq(&received).into()
}

/// Verifies a signature with the configured secret, then the previous
/// secret if key rotation is configured.
#[must_use]
pub fn verify_with_config(message: &str, received_hex: &str, config: &ShopConnectConfig) -> bool {
    if verify_signature(message, received_hex, config.api_secret_key().as_ref()) {
        return true;
    }

    config
        .old_api_secret_key()
        .is_some_and(|old| verify_signature(message, received_hex, old.as_ref()))
}
