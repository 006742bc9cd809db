//! # shop-connect
//!
//! A multi-tenant service that connects Shopify stores through the OAuth
//! authorization code grant and reads their orders on the tenant's behalf.
//!
//! ## Overview
//!
//! - Type-safe configuration via [`ShopConnectConfig`] and [`ShopConnectConfigBuilder`]
//! - Validated newtypes for API credentials and domain values
//! - Authorization URL construction, callback HMAC verification and code
//!   exchange via [`auth::oauth`]
//! - Bearer authentication of the service's own callers via [`auth::Authenticator`]
//! - Tenant credential persistence behind [`store::CredentialStore`]
//! - Paginated order retrieval with a page-URL host guard via [`rest`]
//! - An axum router exposing all of the above via [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shop_connect::{ApiKey, ApiSecretKey, ApiVersion, HostUrl, ShopConnectConfig};
//! use shop_connect::auth::oauth::begin_auth;
//!
//! let config = ShopConnectConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .scopes("read_orders".parse().unwrap())
//!     .redirect_uri(HostUrl::new("https://app.example.com/callback").unwrap())
//!     .api_version(ApiVersion::latest())
//!     .build()
//!     .unwrap();
//!
//! let result = begin_auth(&config, "my-store", None).unwrap();
//! assert!(result.auth_url.starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
//! ```
//!
//! ## Completing the Callback
//!
//! ```rust,ignore
//! use shop_connect::auth::oauth::{complete_callback, CallbackParams};
//!
//! let params = CallbackParams::from_map(body)?;
//! let shop = complete_callback(&http, &config, &store, &tenant, &params, None).await?;
//! ```
//!
//! The shop domain is checked first, then the HMAC, then the code is
//! exchanged exactly once. The token is written to the store only after all
//! three succeed.
//!
//! ## Fetching Orders
//!
//! ```rust,ignore
//! use shop_connect::rest::{fetch_orders, OrderFilters, OrdersRequest};
//!
//! let profile = store.get(&tenant).await?;
//! let page = fetch_orders(&http, &config, &profile.credentials(),
//!     OrdersRequest::FirstPage(OrderFilters::default())).await?;
//!
//! if let Some(next) = page.next_page_url {
//!     // Rejected unless `next` points at the tenant's own shop
//!     let page = fetch_orders(&http, &config, &profile.credentials(),
//!         OrdersRequest::Cursor(next)).await?;
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Secrets stay secret**: tokens and keys are masked in `Debug` output
//!   and never appear in responses

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;
pub mod server;
pub mod store;

// Re-export public types at crate root for convenience
pub use auth::{AccessToken, AuthScopes, ShopCredentials, TenantId};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, HostUrl, ShopConnectConfig, ShopConnectConfigBuilder,
    ShopDomain, ShopName,
};
pub use error::{ConfigError, Error, ErrorKind, Result};

// Re-export HTTP client types
pub use clients::{HttpClient, HttpError};

// Re-export the HTTP surface
pub use server::{build_router, AppState};
