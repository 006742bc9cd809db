//! HTTP request types.
//!
//! An [`HttpRequest`] always names the shop it is for. The client derives
//! the destination from that shop (or from the configured upstream host
//! override), so a request can never be pointed at an arbitrary host.

use std::fmt;

use crate::auth::AccessToken;
use crate::clients::errors::InvalidHttpRequestError;
use crate::config::ShopDomain;

/// HTTP methods used against Shopify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET, for resource reads.
    Get,
    /// HTTP POST, for the token endpoint.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// Where on the shop a request goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestTarget {
    /// A path on the shop, such as `/admin/oauth/access_token`.
    Path(String),
    /// An absolute URL returned by the shop, replayed as-is. Its host must
    /// already have been checked against the shop.
    Absolute(url::Url),
}

/// A request to be sent to a shop.
///
/// # Example
///
/// ```rust
/// use shop_connect::clients::{HttpMethod, HttpRequest};
/// use shop_connect::ShopDomain;
///
/// let shop = ShopDomain::new("my-store.myshopify.com").unwrap();
/// let request = HttpRequest::builder(HttpMethod::Get, shop)
///     .path("/admin/api/2025-10/orders.json")
///     .query_param("status", "any")
///     .tries(3)
///     .build()
///     .unwrap();
/// assert_eq!(request.tries, 3);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The shop this request is for.
    pub shop: ShopDomain,
    /// The path or absolute URL on the shop.
    pub target: RequestTarget,
    /// Query parameters, in order. Ignored for absolute targets.
    pub query: Vec<(String, String)>,
    /// JSON body, required for POST.
    pub body: Option<serde_json::Value>,
    /// Access token sent as `X-Shopify-Access-Token`.
    pub access_token: Option<AccessToken>,
    /// Number of times to attempt the request (default: 1).
    pub tries: u32,
}

impl HttpRequest {
    /// Creates a new builder for a request to `shop`.
    #[must_use]
    pub fn builder(method: HttpMethod, shop: ShopDomain) -> HttpRequestBuilder {
        HttpRequestBuilder {
            http_method: method,
            shop,
            target: None,
            query: Vec::new(),
            body: None,
            access_token: None,
            tries: 1,
        }
    }

    /// Returns a short description of the target for logs, without query.
    #[must_use]
    pub fn log_path(&self) -> &str {
        match &self.target {
            RequestTarget::Path(path) => path,
            RequestTarget::Absolute(url) => url.path(),
        }
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    shop: ShopDomain,
    target: Option<RequestTarget>,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    access_token: Option<AccessToken>,
    tries: u32,
}

impl HttpRequestBuilder {
    /// Targets a path on the shop.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.target = Some(RequestTarget::Path(path.into()));
        self
    }

    /// Targets an absolute URL previously returned by the shop.
    #[must_use]
    pub fn absolute(mut self, url: url::Url) -> Self {
        self.target = Some(RequestTarget::Absolute(url));
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the access token header.
    #[must_use]
    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Sets how many times the request may be attempted.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if a POST has no body or `tries`
    /// is zero.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        if self.http_method == HttpMethod::Post && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }
        if self.tries == 0 {
            return Err(InvalidHttpRequestError::ZeroTries);
        }

        Ok(HttpRequest {
            http_method: self.http_method,
            target: self
                .target
                .unwrap_or_else(|| RequestTarget::Path("/".to_string())),
            shop: self.shop,
            query: self.query,
            body: self.body,
            access_token: self.access_token,
            tries: self.tries,
        })
    }
}
