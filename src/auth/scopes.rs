//! OAuth scope handling.
//!
//! The authorization URL carries the configured scopes; the token endpoint
//! answers with the scopes actually granted. [`AuthScopes`] parses both so
//! they can be compared.

use crate::error::ConfigError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A set of OAuth scopes.
///
/// Scopes are kept sorted and deduplicated, so `Display` is stable. Write
/// scopes imply their read counterpart (`write_orders` implies
/// `read_orders`), mirroring what Shopify grants.
///
/// # Example
///
/// ```rust
/// use shop_connect::AuthScopes;
///
/// let scopes: AuthScopes = "write_orders, read_products".parse().unwrap();
/// assert_eq!(scopes.to_string(), "read_orders,read_products,write_orders");
///
/// let required: AuthScopes = "read_orders".parse().unwrap();
/// assert!(scopes.covers(&required));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if every scope in `other` is present here.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.is_subset(&self.scopes)
    }

    /// Returns the scopes in `other` that this set lacks.
    #[must_use]
    pub fn missing_from(&self, other: &Self) -> Vec<String> {
        other.scopes.difference(&self.scopes).cloned().collect()
    }

    fn implied(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            if let Some(implied) = Self::implied(scope) {
                scopes.insert(implied);
            }
            scopes.insert(scope.to_string());
        }

        Ok(Self { scopes })
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.scopes {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(scope)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_scopes_parses_comma_separated() {
        let scopes: AuthScopes = " read_products,, read_orders ,read_products".parse().unwrap();
        assert_eq!(scopes.to_string(), "read_orders,read_products");
    }

    #[test]
    fn test_auth_scopes_handles_implied_scopes() {
        let scopes: AuthScopes = "write_orders,unauthenticated_write_checkouts"
            .parse()
            .unwrap();
        assert_eq!(
            scopes.to_string(),
            "read_orders,unauthenticated_read_checkouts,unauthenticated_write_checkouts,write_orders"
        );
    }

    #[test]
    fn test_auth_scopes_rejects_invalid_characters() {
        assert!(matches!(
            "read_orders&redirect_uri=x".parse::<AuthScopes>(),
            Err(ConfigError::InvalidScopes { .. })
        ));
        assert!("read orders".parse::<AuthScopes>().is_err());
    }

    #[test]
    fn test_covers_and_missing() {
        let granted: AuthScopes = "read_orders".parse().unwrap();
        let requested: AuthScopes = "read_orders,read_customers".parse().unwrap();

        assert!(!granted.covers(&requested));
        assert!(requested.covers(&granted));
        assert_eq!(granted.missing_from(&requested), vec!["read_customers"]);
        assert!(AuthScopes::default().is_empty());
    }
}
