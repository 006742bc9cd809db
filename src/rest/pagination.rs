//! Cursor pagination and the page-URL host guard.
//!
//! Shopify paginates REST listings with a `Link` header whose `rel="next"`
//! entry is an absolute URL. Clients send that URL back to fetch the next
//! page, which makes it untrusted input: before it is requested, its host
//! must be the tenant's own shop. [`check_cursor`] enforces this before any
//! network activity.

use crate::config::ShopDomain;
use crate::error::{Error, Result};

/// Which hosts a follow-up page URL may target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageHostPolicy {
    /// Only the tenant's own shop domain.
    #[default]
    ExactShop,
    /// Any canonical `*.myshopify.com` domain. Opt-in only; this lets one
    /// tenant's token be sent to another shop.
    AnyMyshopifyDomain,
}

impl PageHostPolicy {
    /// Returns `true` if `host` may be requested on behalf of `shop`.
    #[must_use]
    pub fn permits(self, host: &str, shop: &ShopDomain) -> bool {
        match self {
            Self::ExactShop => host == shop.as_ref(),
            Self::AnyMyshopifyDomain => ShopDomain::new(host).is_ok(),
        }
    }
}

/// A page URL that passed [`check_cursor`].
///
/// The URL is held in its WHATWG-normalized form, which is also what the
/// HTTP client sends: the host is lower-cased, a default `:443` is dropped,
/// dot segments are resolved and characters outside the query set are
/// percent-encoded. The host check runs on this same form, so the request
/// goes exactly where the check looked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageCursor(url::Url);

impl PageCursor {
    /// Returns the URL to request.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.0
    }

    /// Consumes the cursor, returning the URL.
    #[must_use]
    pub fn into_url(self) -> url::Url {
        self.0
    }
}

/// Validates an untrusted page URL for `shop`.
///
/// The URL must parse, use `https`, carry no credentials or explicit port,
/// and name a host the policy permits.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] if `raw` is not an absolute URL.
/// - [`Error::SsrfRejected`] for any other violation.
///
/// # Example
///
/// ```rust
/// use shop_connect::rest::{check_cursor, PageHostPolicy};
/// use shop_connect::{ErrorKind, ShopDomain};
///
/// let shop = ShopDomain::new("my-store.myshopify.com").unwrap();
///
/// let ok = check_cursor(
///     "https://my-store.myshopify.com/admin/api/2025-10/orders.json?page_info=abc",
///     &shop,
///     PageHostPolicy::ExactShop,
/// );
/// assert!(ok.is_ok());
///
/// let err = check_cursor("https://169.254.169.254/latest/meta-data", &shop, PageHostPolicy::ExactShop)
///     .unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::SsrfRejected);
/// ```
pub fn check_cursor(raw: &str, shop: &ShopDomain, policy: PageHostPolicy) -> Result<PageCursor> {
    let url = url::Url::parse(raw.trim())
        .map_err(|e| Error::invalid("pageUrl", format!("not an absolute URL: {e}")))?;

    let host = url.host_str().unwrap_or_default().to_string();
    let reject = |reason: &str| {
        tracing::warn!(shop = %shop, host = %host, reason, "page url rejected");
        Error::SsrfRejected { host: host.clone() }
    };

    if url.scheme() != "https" {
        return Err(reject("scheme"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(reject("credentials"));
    }
    if url.port().is_some() {
        return Err(reject("port"));
    }
    if !policy.permits(&host, shop) {
        return Err(reject("host"));
    }

    Ok(PageCursor(url))
}

/// Extracts the `rel="next"` URL from a `Link` header.
///
/// URLs are taken from between angle brackets, so commas inside a URL do
/// not split entries.
///
/// ```rust
/// use shop_connect::rest::parse_next_link;
///
/// let header = r#"<https://s.myshopify.com/admin/api/2025-10/orders.json?page_info=p>; rel="previous", <https://s.myshopify.com/admin/api/2025-10/orders.json?page_info=n>; rel="next""#;
/// assert_eq!(
///     parse_next_link(header).as_deref(),
///     Some("https://s.myshopify.com/admin/api/2025-10/orders.json?page_info=n")
/// );
/// assert_eq!(parse_next_link(r#"<https://x>; rel="previous""#), None);
/// ```
#[must_use]
pub fn parse_next_link(header: &str) -> Option<String> {
    let mut rest = header;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>')?;
        let url = after[..end].trim();
        let tail = &after[end + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());

        if tail[..params_end].split(';').any(is_rel_next) && !url.is_empty() {
            return Some(url.to_string());
        }
        rest = &tail[params_end..];
    }

    None
}

fn is_rel_next(param: &str) -> bool {
    let Some((name, value)) = param.split_once('=') else {
        return false;
    };
    name.trim().eq_ignore_ascii_case("rel")
        && value
            .trim_matches(|c: char| c == '"' || c == ',' || c.is_whitespace())
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}
