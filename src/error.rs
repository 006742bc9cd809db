//! Error types for shop-connect.
//!
//! Two layers of errors live here:
//!
//! - [`ConfigError`]: raised while building configuration and validated
//!   newtypes. These fail fast at construction time.
//! - [`Error`]: the tagged error returned by every OAuth, fetch and store
//!   operation. Each variant maps to exactly one [`ErrorKind`], and each kind
//!   maps to exactly one HTTP status, so the HTTP layer never inspects
//!   message text.
//!
//! # Example
//!
//! ```rust
//! use shop_connect::{ApiKey, ConfigError, Error, ErrorKind};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//!
//! let error = Error::HmacVerificationFailed;
//! assert_eq!(error.kind(), ErrorKind::HmacVerificationFailed);
//! assert_eq!(error.status_code(), 400);
//! ```

use std::fmt;

use thiserror::Error;

use crate::clients::HttpError;

/// Errors that can occur while building configuration.
///
/// Each variant provides a clear, actionable error message. None of them
/// ever echoes a secret value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// Shop name (subdomain only) is invalid.
    #[error("Invalid shop name format '{name}'. Use only the subdomain (e.g., \"my-store\").")]
    InvalidShopName {
        /// The invalid name that was provided.
        name: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-01') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host URL is invalid.
    #[error("Invalid URL '{url}'. Please provide an absolute http(s) URL (e.g., 'https://myapp.example.com/callback').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A numeric or boolean setting could not be parsed.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidSetting {
        /// The environment variable or field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// No redirect URI is configured and none was accepted from the caller.
    #[error("No OAuth redirect URI is configured")]
    MissingRedirectUri,
}

/// The error taxonomy of the service.
///
/// `ErrorKind` is what callers branch on. It is deliberately small and
/// stable; the richer [`Error`] variants carry the details.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required request parameter was absent or empty.
    MissingParameter,
    /// A parameter was present but malformed.
    InvalidFormat,
    /// The OAuth callback signature did not verify.
    HmacVerificationFailed,
    /// A page URL pointed at a host other than the tenant's shop.
    SsrfRejected,
    /// Shopify answered with a non-success status or an unusable body.
    UpstreamError,
    /// An outbound call exceeded its timeout.
    UpstreamTimeout,
    /// The token endpoint answered 2xx without an access token.
    TokenMissing,
    /// The caller's bearer token was missing or invalid.
    Unauthenticated,
    /// The tenant has no stored Shopify connection.
    ProfileNotFound,
    /// Server configuration is incomplete.
    ConfigurationError,
    /// The credential store could not be reached.
    StoreUnavailable,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::MissingParameter
            | Self::InvalidFormat
            | Self::HmacVerificationFailed
            | Self::SsrfRejected => 400,
            Self::Unauthenticated => 401,
            Self::ProfileNotFound => 404,
            Self::UpstreamError
            | Self::UpstreamTimeout
            | Self::TokenMissing
            | Self::ConfigurationError
            | Self::StoreUnavailable => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingParameter => "missing_parameter",
            Self::InvalidFormat => "invalid_format",
            Self::HmacVerificationFailed => "hmac_verification_failed",
            Self::SsrfRejected => "ssrf_rejected",
            Self::UpstreamError => "upstream_error",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::TokenMissing => "token_missing",
            Self::Unauthenticated => "unauthenticated",
            Self::ProfileNotFound => "profile_not_found",
            Self::ConfigurationError => "configuration_error",
            Self::StoreUnavailable => "store_unavailable",
        };
        f.write_str(name)
    }
}

/// Errors returned by the OAuth flow, the order fetcher and the stores.
///
/// `Display` output is safe to log but is not always what a client sees;
/// use [`Error::public_message`] for response bodies. Neither ever contains
/// an access token or the API secret.
#[derive(Debug, Error)]
pub enum Error {
    /// A required parameter was absent or empty.
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Name of the missing parameter.
        name: String,
    },

    /// A parameter was present but malformed.
    #[error("Invalid {field}: {reason}")]
    InvalidFormat {
        /// Which input was rejected.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The callback HMAC did not verify. Intentionally carries no detail.
    #[error("HMAC verification failed")]
    HmacVerificationFailed,

    /// A page URL did not target the tenant's shop domain.
    #[error("Page URL host '{host}' does not match the connected shop")]
    SsrfRejected {
        /// The host found in the rejected URL (empty if none could be parsed).
        host: String,
    },

    /// Shopify returned a non-success status for a resource request.
    #[error("Shopify API error: status {status}")]
    Upstream {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body, for operators only.
        body: String,
    },

    /// Shopify answered with a success status but a body that could not be
    /// decoded.
    #[error("Invalid payload from Shopify (status {status}): {reason}")]
    InvalidPayload {
        /// Upstream HTTP status code.
        status: u16,
        /// Decode failure, for operators only.
        reason: String,
    },

    /// The authorization code exchange was rejected by Shopify.
    #[error("Token exchange failed with status {status}")]
    TokenExchangeFailed {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body, for operators only.
        body: String,
    },

    /// The request could not be delivered (DNS, TLS, connection reset).
    #[error("Upstream request failed: {message}")]
    Transport {
        /// Transport-level failure description.
        message: String,
    },

    /// An outbound request exceeded its timeout.
    #[error("Upstream request timed out")]
    UpstreamTimeout,

    /// The token endpoint answered 2xx without an `access_token`.
    #[error("Failed to retrieve access token")]
    TokenMissing,

    /// The bearer token was missing or invalid.
    #[error("Authentication failed")]
    Unauthenticated,

    /// No stored Shopify connection exists for the tenant.
    #[error("Shopify store is not connected for this account")]
    ProfileNotFound,

    /// Server configuration is incomplete or invalid.
    #[error("Server configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The credential store could not complete the operation.
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    /// Returns the taxonomy kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } => ErrorKind::MissingParameter,
            Self::InvalidFormat { .. } => ErrorKind::InvalidFormat,
            Self::HmacVerificationFailed => ErrorKind::HmacVerificationFailed,
            Self::SsrfRejected { .. } => ErrorKind::SsrfRejected,
            Self::Upstream { .. }
            | Self::InvalidPayload { .. }
            | Self::TokenExchangeFailed { .. }
            | Self::Transport { .. } => ErrorKind::UpstreamError,
            Self::UpstreamTimeout => ErrorKind::UpstreamTimeout,
            Self::TokenMissing => ErrorKind::TokenMissing,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::ProfileNotFound => ErrorKind::ProfileNotFound,
            Self::Configuration(_) => ErrorKind::ConfigurationError,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// This is the kind's status, except that a token exchange rejected with
    /// a 4xx upstream status is attributed to the caller's input (bad code or
    /// bad shop) and reported as 400.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::TokenExchangeFailed { status, .. } if *status >= 400 && *status < 500 => 400,
            _ => self.kind().status_code(),
        }
    }

    /// Returns the message that may be shown to an end user.
    ///
    /// Upstream bodies, store details and configuration details are withheld.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::TokenExchangeFailed { status, .. } if *status >= 400 && *status < 500 => {
                "Invalid authorization code or shop".to_string()
            }
            Self::TokenExchangeFailed { .. } => "Failed to exchange token".to_string(),
            Self::Upstream { status, .. } => format!("Shopify API error: {status}"),
            Self::InvalidPayload { .. } => "Unexpected response from Shopify".to_string(),
            Self::Transport { .. } => "Upstream request failed".to_string(),
            Self::SsrfRejected { .. } => "Invalid page URL".to_string(),
            Self::Configuration(_) => "Server configuration error".to_string(),
            Self::StoreUnavailable(_) => "Credential store unavailable".to_string(),
            _ => self.to_string(),
        }
    }

    /// Shorthand for an [`Error::InvalidFormat`].
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Response(e) => Self::Upstream {
                status: e.code,
                body: e.body,
            },
            HttpError::MaxRetries(e) => Self::Upstream {
                status: e.code,
                body: e.body,
            },
            HttpError::Timeout => Self::UpstreamTimeout,
            HttpError::Network(e) => Self::Transport {
                message: e.to_string(),
            },
            HttpError::InvalidRequest(e) => Self::Transport {
                message: e.to_string(),
            },
        }
    }
}

/// Result alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

// Verify Error is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
};
