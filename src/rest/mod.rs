//! Admin REST API resources.
//!
//! The service reads one resource, orders, a page at a time:
//!
//! - [`Order`]: the order fields exposed to clients
//! - [`fetch_orders`]: fetches the first page or a follow-up page
//! - [`check_cursor`]: the host guard every follow-up page URL passes first
//! - [`parse_next_link`]: extracts the next page URL from a `Link` header
//!
//! # Example
//!
//! ```rust,no_run
//! use shop_connect::auth::{AccessToken, ShopCredentials};
//! use shop_connect::clients::HttpClient;
//! use shop_connect::rest::{fetch_orders, OrderFilters, OrdersRequest};
//! use shop_connect::{ApiKey, ApiSecretKey, ShopConnectConfig, ShopDomain};
//!
//! # async fn run() -> Result<(), shop_connect::Error> {
//! let config = ShopConnectConfig::builder()
//!     .api_key(ApiKey::new("key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .build()?;
//! let http = HttpClient::new(&config)?;
//! let credentials = ShopCredentials {
//!     shop: ShopDomain::new("my-store.myshopify.com")?,
//!     access_token: AccessToken::new("shpat_xxx"),
//! };
//!
//! let filters = OrderFilters::parse(Some("2024-01-01"), None)?;
//! let mut page = fetch_orders(&http, &config, &credentials, OrdersRequest::FirstPage(filters)).await?;
//! while let Some(next) = page.next_page_url.take() {
//!     page = fetch_orders(&http, &config, &credentials, OrdersRequest::Cursor(next)).await?;
//! }
//! # Ok(())
//! # }
//! ```

mod order;
mod orders;
mod pagination;

pub use order::{Order, ShippingAddress, ORDER_FIELDS};
pub use orders::{fetch_orders, OrderFilters, OrdersPage, OrdersRequest, PAGE_LIMIT};
pub use pagination::{check_cursor, parse_next_link, PageCursor, PageHostPolicy};
