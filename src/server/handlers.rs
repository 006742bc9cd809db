//! Endpoint handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::oauth::{begin_auth, complete_callback, CallbackParams};
use crate::error::{Error, Result};
use crate::rest::{self, OrderFilters, OrdersPage, OrdersRequest};
use crate::server::extract::{AuthenticatedTenant, ValidatedJson};
use crate::server::AppState;

const CONNECTED_MESSAGE: &str = "Shopify store connected successfully.";

/// Body of `POST /get-auth-url`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthUrlRequest {
    /// Shop subdomain, e.g. `my-store`.
    #[serde(default)]
    pub shop_name: Option<String>,
    /// Redirect URI override, honoured only when enabled in configuration.
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

/// Response of `POST /get-auth-url`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUrlResponse {
    /// Where to send the merchant.
    pub auth_url: String,
    /// The redirect URI embedded in `auth_url`.
    pub redirect_uri: String,
    /// The `state` value embedded in `auth_url`.
    pub state: String,
}

/// Response of `POST /auth-callback`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthCallbackResponse {
    /// Human readable confirmation.
    pub message: String,
}

/// Body of `POST /fetch-orders`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FetchOrdersRequest {
    /// The `nextPageUrl` of a previous response.
    #[serde(default)]
    pub page_url: Option<String>,
    /// Lower creation-date bound for the first page.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Upper creation-date bound for the first page.
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Response of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) async fn get_auth_url(
    State(state): State<AppState>,
    AuthenticatedTenant(tenant): AuthenticatedTenant,
    ValidatedJson(body): ValidatedJson<AuthUrlRequest>,
) -> Result<Json<AuthUrlResponse>> {
    let shop_name = non_empty(body.shop_name).ok_or_else(|| Error::MissingParameter {
        name: "shopName".to_string(),
    })?;
    let redirect_override = non_empty(body.redirect_uri);

    let result = begin_auth(&state.config, &shop_name, redirect_override.as_deref())?;
    state
        .pending_states
        .issue(&tenant, result.state.clone())
        .await;
    tracing::info!(tenant = %tenant, shop_name = %shop_name, "issued authorization url");

    Ok(Json(AuthUrlResponse {
        auth_url: result.auth_url,
        redirect_uri: result.redirect_uri,
        state: result.state.to_string(),
    }))
}

pub(crate) async fn auth_callback(
    State(state): State<AppState>,
    AuthenticatedTenant(tenant): AuthenticatedTenant,
    ValidatedJson(body): ValidatedJson<Map<String, Value>>,
) -> Result<Json<AuthCallbackResponse>> {
    let params = CallbackParams::from_map(body)?;
    let expected_state = state.pending_states.expected(&tenant).await;

    complete_callback(
        &state.http,
        &state.config,
        state.store.as_ref(),
        &tenant,
        &params,
        expected_state.as_ref(),
    )
    .await?;
    state.pending_states.clear(&tenant).await;

    Ok(Json(AuthCallbackResponse {
        message: CONNECTED_MESSAGE.to_string(),
    }))
}

pub(crate) async fn fetch_orders(
    State(state): State<AppState>,
    AuthenticatedTenant(tenant): AuthenticatedTenant,
    ValidatedJson(body): ValidatedJson<FetchOrdersRequest>,
) -> Result<Json<OrdersPage>> {
    let request = match non_empty(body.page_url) {
        Some(page_url) => {
            if body.start_date.is_some() || body.end_date.is_some() {
                tracing::debug!("date filters ignored for a follow-up page");
            }
            OrdersRequest::Cursor(page_url)
        }
        None => OrdersRequest::FirstPage(OrderFilters::parse(
            body.start_date.as_deref(),
            body.end_date.as_deref(),
        )?),
    };

    let profile = state.store.get(&tenant).await?;
    let page = rest::fetch_orders(&state.http, &state.config, &profile.credentials(), request).await?;

    Ok(Json(page))
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
