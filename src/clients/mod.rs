//! HTTP client layer for outbound calls to Shopify.
//!
//! # Overview
//!
//! - [`HttpClient`]: the shared async client (timeout, retries, host override)
//! - [`HttpRequest`]: a request bound to one shop
//! - [`HttpResponse`]: a parsed response
//! - [`HttpError`]: transport and status failures
//!
//! # Retry Behavior
//!
//! A request is attempted up to its `tries` count (default 1, i.e. no
//! retries):
//!
//! - **429**: waits for `Retry-After` if present, otherwise the backoff
//! - **5xx, timeouts, connection failures**: exponential backoff from the
//!   configured base delay
//! - **Other 4xx**: returned immediately
//!
//! The token exchange always uses a single try; only resource reads opt in
//! to retries.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder, RequestTarget};
pub use http_response::HttpResponse;
