//! Shared fixtures for the integration tests.
//!
//! Upstream Shopify is a wiremock server reached through the `api_host`
//! override; requests still carry the shop domain in their `Host` header.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{Map, Value};
use tower::ServiceExt;
use wiremock::MockServer;

use shop_connect::auth::oauth::hmac::{canonical_message, compute_signature};
use shop_connect::auth::JwtAuthenticator;
use shop_connect::store::InMemoryCredentialStore;
use shop_connect::{
    build_router, ApiKey, ApiSecretKey, AppState, HostUrl, ShopConnectConfig,
    ShopConnectConfigBuilder,
};

pub const API_KEY: &str = "test-api-key";
pub const API_SECRET: &str = "test-api-secret";
pub const JWT_SECRET: &str = "test-jwt-secret";
pub const JWT_AUDIENCE: &str = "authenticated";
pub const SHOP: &str = "test-shop.myshopify.com";
pub const REDIRECT_URI: &str = "https://app.example.com/shopify/callback";
pub const ALLOWED_ORIGIN: &str = "https://app.example.com";

/// A builder preconfigured to send every upstream request to `server`.
pub fn config_builder(server: &MockServer) -> ShopConnectConfigBuilder {
    ShopConnectConfig::builder()
        .api_key(ApiKey::new(API_KEY).unwrap())
        .api_secret_key(ApiSecretKey::new(API_SECRET).unwrap())
        .redirect_uri(HostUrl::new(REDIRECT_URI).unwrap())
        .api_host(HostUrl::new(server.uri()).unwrap())
        .allowed_origin(ALLOWED_ORIGIN)
        .retry_backoff(Duration::from_millis(10))
}

pub fn config(server: &MockServer) -> ShopConnectConfig {
    config_builder(server).build().unwrap()
}

/// The router plus a handle on its store.
pub fn app(config: ShopConnectConfig) -> (Router, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let authenticator = JwtAuthenticator::new(JWT_SECRET, Some(JWT_AUDIENCE)).unwrap();
    let state = AppState::new(config, store.clone(), Arc::new(authenticator)).unwrap();
    (build_router(state).unwrap(), store)
}

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    aud: &'a str,
    exp: i64,
}

/// A bearer token for `tenant`, valid for five minutes.
pub fn bearer(tenant: &str) -> String {
    let claims = Claims {
        sub: tenant,
        aud: JWT_AUDIENCE,
        exp: chrono::Utc::now().timestamp() + 300,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

/// A callback body for `code`/`shop`, signed with `secret`.
pub fn signed_callback(code: &str, shop: &str, secret: &str) -> Value {
    signed_callback_with_state(code, shop, secret, "0123456789abcdefghijABCDEFGHIJkl")
}

/// A callback body echoing `state`, signed with `secret`.
pub fn signed_callback_with_state(code: &str, shop: &str, secret: &str, state: &str) -> Value {
    let timestamp = "1700000000";
    let message = canonical_message([
        ("code", code),
        ("shop", shop),
        ("state", state),
        ("timestamp", timestamp),
    ]);

    let mut body = Map::new();
    body.insert("code".into(), code.into());
    body.insert("shop".into(), shop.into());
    body.insert("state".into(), state.into());
    body.insert("timestamp".into(), timestamp.into());
    body.insert("hmac".into(), compute_signature(&message, secret).into());
    Value::Object(body)
}

/// An authenticated JSON POST.
pub fn post_json(uri: &str, tenant: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", bearer(tenant))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends `request` and returns status, headers and the body as JSON
/// (`Value::Null` for an empty body).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}
