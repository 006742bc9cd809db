//! Authorization code exchange.
//!
//! Trades the code from a verified callback for an offline access token:
//! one POST to `https://<shop>/admin/oauth/access_token` with
//! `{client_id, client_secret, code}`.
//!
//! Authorization codes are single-use, so the request is made exactly once
//! and never retried. A replayed callback therefore reaches Shopify once
//! more and is reported as Shopify's rejection.

use serde::Deserialize;
use serde_json::json;

use crate::auth::oauth::callback::VerifiedCallback;
use crate::auth::{AccessToken, AuthScopes};
use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::config::ShopConnectConfig;
use crate::error::{Error, Result};

const ACCESS_TOKEN_PATH: &str = "/admin/oauth/access_token";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Exchanges a verified authorization code for an access token.
///
/// # Errors
///
/// - [`Error::TokenExchangeFailed`] for a non-2xx answer. A 4xx answer is
///   reported to clients as `Invalid authorization code or shop`.
/// - [`Error::UpstreamTimeout`] if the request timed out.
/// - [`Error::Transport`] if the request could not be delivered.
/// - [`Error::TokenMissing`] if a 2xx answer carries no usable token.
#[tracing::instrument(skip_all, fields(shop = %verified.shop()))]
pub async fn exchange_code(
    http: &HttpClient,
    config: &ShopConnectConfig,
    verified: &VerifiedCallback,
) -> Result<AccessToken> {
    let request = HttpRequest::builder(HttpMethod::Post, verified.shop().clone())
        .path(ACCESS_TOKEN_PATH)
        .body(json!({
            "client_id": config.api_key().as_ref(),
            "client_secret": config.api_secret_key().as_ref(),
            "code": verified.code(),
        }))
        .tries(1)
        .build()
        .map_err(HttpError::from)?;

    let response = match http.request(request).await {
        Ok(response) => response,
        Err(HttpError::Response(e)) => {
            tracing::warn!(status = e.code, body = %e.body, "token exchange rejected");
            return Err(Error::TokenExchangeFailed {
                status: e.code,
                body: e.body,
            });
        }
        Err(HttpError::MaxRetries(e)) => {
            return Err(Error::TokenExchangeFailed {
                status: e.code,
                body: e.body,
            });
        }
        Err(other) => {
            tracing::warn!(error = %other, "token exchange failed");
            return Err(other.into());
        }
    };

    let parsed: AccessTokenResponse = response.json().map_err(|e| {
        tracing::warn!(error = %e, "token response was not valid JSON");
        Error::TokenMissing
    })?;

    let token = parsed
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            tracing::warn!("token response carried no access_token");
            Error::TokenMissing
        })?;

    if let Some(granted) = parsed.scope.and_then(|s| s.parse::<AuthScopes>().ok()) {
        if !granted.covers(config.scopes()) {
            tracing::warn!(
                missing = ?granted.missing_from(config.scopes()),
                "shop granted fewer scopes than requested"
            );
        }
    }

    Ok(AccessToken::new(token))
}
