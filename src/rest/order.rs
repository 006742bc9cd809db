//! Order resource as returned by the Admin REST API.
//!
//! Only the fields requested with `fields=` are modelled; anything else
//! Shopify adds is ignored. Field names stay in Shopify's snake_case so the
//! objects pass through to clients unchanged.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The `fields=` selection sent with every order listing.
pub const ORDER_FIELDS: &str = "id,created_at,total_price,shipping_address";

/// An order, reduced to the fields the service requests.
///
/// `created_at` keeps the shop's UTC offset as returned.
///
/// # Example
///
/// ```rust
/// use shop_connect::rest::Order;
///
/// let order: Order = serde_json::from_str(r#"{
///     "id": 450789469,
///     "created_at": "2024-01-05T10:00:00-05:00",
///     "total_price": "199.65",
///     "shipping_address": {"country_code": "US", "province_code": "KY", "city": "Louisville"}
/// }"#).unwrap();
///
/// assert_eq!(order.id, 450789469);
/// assert_eq!(order.shipping_address.unwrap().province_code.as_deref(), Some("KY"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The unique identifier of the order.
    pub id: u64,

    /// When the order was created.
    pub created_at: DateTime<FixedOffset>,

    /// The total price, as a decimal string in shop currency.
    pub total_price: String,

    /// Where the order ships to, if it ships at all.
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

/// The part of a shipping address the service exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShippingAddress {
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country_code: Option<String>,

    /// Province or state code.
    #[serde(default)]
    pub province_code: Option<String>,
}
