//! Paginated order listing.
//!
//! One call fetches one page. The first page is built from date filters;
//! later pages replay the `rel="next"` URL Shopify returned, after it has
//! passed [`check_cursor`].

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::ShopCredentials;
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::config::ShopConnectConfig;
use crate::error::{Error, Result};
use crate::rest::order::{Order, ORDER_FIELDS};
use crate::rest::pagination::{check_cursor, parse_next_link};

/// Maximum page size accepted by the Admin REST API.
pub const PAGE_LIMIT: u32 = 250;

/// Optional `created_at` bounds for the first page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderFilters {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl OrderFilters {
    /// Parses client-supplied bounds.
    ///
    /// Each bound is RFC 3339 or a bare `YYYY-MM-DD` date. A bare start date
    /// means the start of that UTC day, a bare end date the end of it.
    /// Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] if a bound does not parse or the
    /// start is after the end.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shop_connect::rest::OrderFilters;
    ///
    /// let filters = OrderFilters::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
    /// assert_eq!(filters.created_at_min().as_deref(), Some("2024-01-01T00:00:00Z"));
    /// assert_eq!(filters.created_at_max().as_deref(), Some("2024-01-31T23:59:59Z"));
    ///
    /// assert!(OrderFilters::parse(Some("2024-02-01"), Some("2024-01-01")).is_err());
    /// ```
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = parse_bound("startDate", start, NaiveTime::MIN)?;
        let end = parse_bound("endDate", end, end_of_day())?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::invalid("startDate", "must not be after endDate"));
            }
        }

        Ok(Self { start, end })
    }

    /// Returns the `created_at_min` query value, if bounded.
    #[must_use]
    pub fn created_at_min(&self) -> Option<String> {
        self.start.map(format_bound)
    }

    /// Returns the `created_at_max` query value, if bounded.
    #[must_use]
    pub fn created_at_max(&self) -> Option<String> {
        self.end.map(format_bound)
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

fn parse_bound(
    field: &'static str,
    raw: Option<&str>,
    day_time: NaiveTime,
) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date.and_time(day_time).and_utc()));
    }

    Err(Error::invalid(
        field,
        format!("'{raw}' is not an RFC 3339 timestamp or YYYY-MM-DD date"),
    ))
}

fn format_bound(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Which page to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrdersRequest {
    /// The first page, optionally bounded by creation date.
    FirstPage(OrderFilters),
    /// A follow-up page, given as the untrusted URL a client sent back.
    Cursor(String),
}

/// One page of orders, as returned to clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrdersPage {
    /// Orders on this page.
    pub orders: Vec<Order>,
    /// URL of the next page; `None` when this is the last page.
    pub next_page_url: Option<String>,
    /// Number of orders on this page.
    pub count: usize,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    orders: Vec<Order>,
}

/// Fetches one page of orders for a connected shop.
///
/// A cursor is checked against the shop before anything is sent. The GET
/// is retried on 429, 5xx and transport failures up to
/// [`ShopConnectConfig::fetch_tries`] attempts.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] or [`Error::SsrfRejected`] for a bad cursor.
/// - [`Error::Upstream`] for a non-2xx answer.
/// - [`Error::InvalidPayload`] for a 2xx answer whose body is not an
///   `orders` envelope.
/// - [`Error::UpstreamTimeout`] or [`Error::Transport`] if the request
///   could not complete.
#[tracing::instrument(skip_all, fields(shop = %credentials.shop))]
pub async fn fetch_orders(
    http: &HttpClient,
    config: &ShopConnectConfig,
    credentials: &ShopCredentials,
    request: OrdersRequest,
) -> Result<OrdersPage> {
    let builder = HttpRequest::builder(HttpMethod::Get, credentials.shop.clone())
        .access_token(credentials.access_token.clone())
        .tries(config.fetch_tries());

    let builder = match request {
        OrdersRequest::Cursor(raw) => {
            let cursor = check_cursor(&raw, &credentials.shop, config.page_host_policy())?;
            tracing::debug!("fetching orders from cursor");
            builder.absolute(cursor.into_url())
        }
        OrdersRequest::FirstPage(filters) => {
            let mut builder = builder
                .path(format!("{}/orders.json", config.api_version().admin_path()))
                .query_param("status", "any")
                .query_param("limit", PAGE_LIMIT.to_string())
                .query_param("fields", ORDER_FIELDS);
            if let Some(min) = filters.created_at_min() {
                builder = builder.query_param("created_at_min", min);
            }
            if let Some(max) = filters.created_at_max() {
                builder = builder.query_param("created_at_max", max);
            }
            tracing::debug!("fetching first page of orders");
            builder
        }
    };

    let request = builder.build().map_err(HttpError::from)?;
    let response = http.request(request).await.map_err(|e| {
        tracing::warn!(error = %e, "order fetch failed");
        Error::from(e)
    })?;

    let envelope: OrdersEnvelope = response.json().map_err(|e| Error::InvalidPayload {
        status: response.code,
        reason: format!("invalid orders payload: {e}"),
    })?;

    let next_page_url = response.link_header().as_deref().and_then(parse_next_link);
    let count = envelope.orders.len();
    tracing::info!(count, has_next = next_page_url.is_some(), "fetched orders");

    Ok(OrdersPage {
        orders: envelope.orders,
        next_page_url,
        count,
    })
}
