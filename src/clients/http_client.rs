//! HTTP client for Shopify API communication.
//!
//! One [`HttpClient`] is built per process from the configuration and shared
//! by every request. It owns the timeout, the retry policy and the upstream
//! host override.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{ACCEPT, HOST};

use crate::clients::errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
use crate::clients::http_request::{HttpMethod, HttpRequest, RequestTarget};
use crate::clients::http_response::HttpResponse;
use crate::config::{HostUrl, ShopConnectConfig, ShopDomain};

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const MAX_RETRY_AFTER_SECS: f64 = 60.0;

/// HTTP client for making requests to Shopify.
///
/// The client handles:
/// - Base URI construction from the shop domain or the `api_host` override
/// - Default headers including User-Agent
/// - A per-request timeout, reported as [`HttpError::Timeout`]
/// - Bounded retries with exponential backoff for 429, 5xx and transport
///   failures, only when the request asks for more than one try
///
/// Redirects are never followed, so a response cannot move a request to a
/// host other than the shop.
///
/// # Example
///
/// ```rust
/// use shop_connect::clients::HttpClient;
/// use shop_connect::{ApiKey, ApiSecretKey, ShopConnectConfig, ShopDomain};
///
/// let config = ShopConnectConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .build()
///     .unwrap();
///
/// let client = HttpClient::new(&config).unwrap();
/// let shop = ShopDomain::new("my-store.myshopify.com").unwrap();
/// assert_eq!(client.base_uri(&shop), "https://my-store.myshopify.com");
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api_host: Option<HostUrl>,
    retry_backoff: Duration,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates the client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &ShopConnectConfig) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{user_agent_prefix}shop-connect v{SDK_VERSION} | Rust {rust_version}");

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(user_agent)
            .timeout(config.request_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            api_host: config.api_host().cloned(),
            retry_backoff: config.retry_backoff(),
        })
    }

    /// Returns the base URI requests for `shop` are sent to.
    #[must_use]
    pub fn base_uri(&self, shop: &ShopDomain) -> String {
        self.api_host
            .as_ref()
            .map_or_else(|| format!("https://{}", shop.as_ref()), HostUrl::origin)
    }

    fn resolve_url(&self, request: &HttpRequest) -> Result<url::Url, InvalidHttpRequestError> {
        let invalid = |url: &str| InvalidHttpRequestError::InvalidUrl {
            url: url.to_string(),
        };

        match &request.target {
            RequestTarget::Path(path) => {
                let raw = format!("{}{}", self.base_uri(&request.shop), path);
                let mut url = url::Url::parse(&raw).map_err(|_| invalid(&raw))?;
                if !request.query.is_empty() {
                    url.query_pairs_mut().extend_pairs(&request.query);
                }
                Ok(url)
            }
            RequestTarget::Absolute(absolute) if self.api_host.is_some() => {
                let base = self.base_uri(&request.shop);
                let mut url = url::Url::parse(&base).map_err(|_| invalid(&base))?;
                url.set_path(absolute.path());
                url.set_query(absolute.query());
                Ok(url)
            }
            RequestTarget::Absolute(absolute) => Ok(absolute.clone()),
        }
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - the request URL cannot be built (`InvalidRequest`)
    /// - the request times out (`Timeout`)
    /// - a network error occurs (`Network`)
    /// - a non-2xx response is received (`Response`)
    /// - retryable responses exhausted every try (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.resolve_url(&request)?;
        let path = request.log_path().to_string();

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(url.clone()),
                HttpMethod::Post => self.client.post(url.clone()),
            };
            req_builder = req_builder.header(ACCEPT, "application/json");

            // Proxy scenario: the upstream still routes on the shop
            if self.api_host.is_some() {
                req_builder = req_builder.header(HOST, request.shop.as_ref());
            }
            if let Some(token) = &request.access_token {
                req_builder = req_builder.header("X-Shopify-Access-Token", token.expose());
            }
            if let Some(body) = &request.body {
                req_builder = req_builder.json(body);
            }

            tracing::debug!(method = %request.http_method, shop = %request.shop, path = %path, attempt = tries, "sending request");

            let outcome = Self::send_once(req_builder).await;

            let delay = match outcome {
                Ok(response) => {
                    if let Some(reason) = response.deprecation_reason() {
                        tracing::warn!(
                            "Deprecated request to Shopify API at {}, received reason: {}",
                            path,
                            reason
                        );
                    }

                    if response.is_ok() {
                        return Ok(response);
                    }

                    let code = response.code;
                    let retryable = code == 429 || code >= 500;
                    if !retryable || tries >= request.tries {
                        return Err(Self::status_error(response, retryable, request.tries));
                    }
                    tracing::warn!(shop = %request.shop, path = %path, status = code, attempt = tries, "retrying request");
                    self.retry_delay(Some(&response), tries)
                }
                Err(err) => {
                    let retryable = match &err {
                        HttpError::Timeout => true,
                        HttpError::Network(e) => e.is_connect() || e.is_request(),
                        _ => false,
                    };
                    if !retryable || tries >= request.tries {
                        return Err(err);
                    }
                    tracing::warn!(shop = %request.shop, path = %path, error = %err, attempt = tries, "retrying request");
                    self.retry_delay(None, tries)
                }
            };

            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(req_builder: reqwest::RequestBuilder) -> Result<HttpResponse, HttpError> {
        let res = req_builder.send().await?;
        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res.text().await?;
        Ok(HttpResponse::new(code, headers, body))
    }

    fn status_error(response: HttpResponse, retryable: bool, max_tries: u32) -> HttpError {
        let error_reference = response.request_id().map(String::from);
        if retryable && max_tries > 1 {
            return HttpError::MaxRetries(MaxHttpRetriesExceededError {
                code: response.code,
                tries: max_tries,
                body: response.body,
                error_reference,
            });
        }
        HttpError::Response(HttpResponseError {
            code: response.code,
            body: response.body,
            error_reference,
        })
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Delay before the next try: `Retry-After` on 429, otherwise the base
    /// backoff doubled per completed try.
    fn retry_delay(&self, response: Option<&HttpResponse>, tries: u32) -> Duration {
        if let Some(retry_after) = response
            .filter(|r| r.code == 429)
            .and_then(|r| r.retry_request_after)
        {
            return Duration::from_secs_f64(retry_after.min(MAX_RETRY_AFTER_SECS));
        }
        let exponent = tries.saturating_sub(1).min(16);
        self.retry_backoff.saturating_mul(1 << exponent)
    }
}
