//! Integration tests for the OAuth endpoints.
//!
//! These tests drive the router end to end: bearer authentication, the
//! authorization URL, callback verification, code exchange against a mock
//! Shopify, and persistence of the resulting token.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shop_connect::store::CredentialStore;
use shop_connect::TenantId;

use common::{
    app, config, config_builder, post_json, send, signed_callback, signed_callback_with_state,
    API_KEY, API_SECRET, SHOP,
};

const TOKEN_PATH: &str = "/admin/oauth/access_token";

// ============================================================================
// Authentication and CORS
// ============================================================================

#[tokio::test]
async fn test_missing_or_invalid_bearer_is_unauthorized() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    let request = Request::builder()
        .method("POST")
        .uri("/get-auth-url")
        .header("content-type", "application/json")
        .body(Body::from(json!({"shopName": "my-store"}).to_string()))
        .unwrap();
    let (status, _, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Authentication failed"}));

    let request = Request::builder()
        .method("POST")
        .uri("/fetch-orders")
        .header("authorization", "Bearer not-a-jwt")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_responses_carry_cors_headers() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    let mut request = post_json("/get-auth-url", "tenant-1", &json!({"shopName": "my-store"}));
    request
        .headers_mut()
        .insert("origin", "https://app.example.com".parse().unwrap());
    let (status, headers, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "https://app.example.com"
    );

    // Errors carry them too
    let request = Request::builder()
        .method("POST")
        .uri("/get-auth-url")
        .header("origin", "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_options_returns_ok_with_empty_body() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    for uri in ["/get-auth-url", "/auth-callback", "/fetch-orders"] {
        let request = Request::builder()
            .method("OPTIONS")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.is_null(), "{uri}");
    }

    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/fetch-orders")
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&router, preflight).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        "https://app.example.com"
    );
    let allowed = headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "{name} in {allowed}");
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

// ============================================================================
// /get-auth-url
// ============================================================================

#[tokio::test]
async fn test_get_auth_url_builds_authorization_redirect() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    let (status, _, body) = send(
        &router,
        post_json("/get-auth-url", "tenant-1", &json!({"shopName": "My-Store"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let auth_url = url::Url::parse(body["authUrl"].as_str().unwrap()).unwrap();
    assert_eq!(auth_url.scheme(), "https");
    assert_eq!(auth_url.host_str(), Some("my-store.myshopify.com"));
    assert_eq!(auth_url.path(), "/admin/oauth/authorize");

    let query: std::collections::HashMap<String, String> =
        auth_url.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], API_KEY);
    assert_eq!(query["scope"], "read_orders");
    assert_eq!(query["redirect_uri"], common::REDIRECT_URI);
    assert_eq!(query["state"], body["state"].as_str().unwrap());
    assert_eq!(body["redirectUri"], common::REDIRECT_URI);

    let state = body["state"].as_str().unwrap();
    assert_eq!(state.len(), 32);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_get_auth_url_rejects_bad_input() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    for shop_name in ["my-store.myshopify.com", "../evil", "-store", "my store"] {
        let (status, _, body) = send(
            &router,
            post_json("/get-auth-url", "tenant-1", &json!({"shopName": shop_name})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{shop_name}");
        assert!(body["error"].as_str().unwrap().contains("shopName"));
    }

    let (status, _, body) = send(&router, post_json("/get-auth-url", "tenant-1", &json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: shopName");

    let (status, _, _) = send(
        &router,
        post_json(
            "/get-auth-url",
            "tenant-1",
            &json!({"shopName": "my-store", "scope": "write_orders"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/get-auth-url")
        .header("authorization", common::bearer("tenant-1"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redirect_override_requires_opt_in() {
    let server = MockServer::start().await;
    let body = json!({"shopName": "my-store", "redirectUri": "http://localhost:3000/callback"});

    let (router, _) = app(config(&server));
    let (status, _, response) = send(&router, post_json("/get-auth-url", "t", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["redirectUri"], common::REDIRECT_URI);

    let (router, _) = app(config_builder(&server).allow_redirect_override(true).build().unwrap());
    let (status, _, response) = send(&router, post_json("/get-auth-url", "t", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["redirectUri"], "http://localhost:3000/callback");

    let bad = json!({"shopName": "my-store", "redirectUri": "javascript:alert(1)"});
    let (status, _, _) = send(&router, post_json("/get-auth-url", "t", &bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// /auth-callback
// ============================================================================

#[tokio::test]
async fn test_callback_exchanges_code_and_stores_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("host", SHOP))
        .and(body_json(json!({
            "client_id": API_KEY,
            "client_secret": API_SECRET,
            "code": "auth-code-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_new_token",
            "scope": "read_orders"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (router, store) = app(config(&server));
    let body = signed_callback("auth-code-1", SHOP, API_SECRET);

    let (status, _, response) = send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response,
        json!({"message": "Shopify store connected successfully."})
    );

    let profile = store.get(&TenantId::new("tenant-1")).await.unwrap();
    assert_eq!(profile.shop_domain.as_ref(), SHOP);
    assert_eq!(profile.access_token.expose(), "shpat_new_token");
}

#[tokio::test]
async fn test_callback_must_echo_the_state_issued_to_the_tenant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_json(json!({
            "client_id": API_KEY,
            "client_secret": API_SECRET,
            "code": "auth-code-1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_new_token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (router, store) = app(config(&server));
    let (status, _, issued) = send(
        &router,
        post_json("/get-auth-url", "tenant-1", &json!({"shopName": "test-shop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let issued_state = issued["state"].as_str().unwrap().to_string();

    // Correctly signed by Shopify, but for a flow this tenant did not start
    let foreign = signed_callback_with_state("auth-code-0", SHOP, API_SECRET, "someone-elses-state");
    let (status, _, response) =
        send(&router, post_json("/auth-callback", "tenant-1", &foreign)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("state"));
    assert!(store.is_empty().await);

    let genuine = signed_callback_with_state("auth-code-1", SHOP, API_SECRET, &issued_state);
    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-1", &genuine)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.get(&TenantId::new("tenant-1")).await.is_ok());
}

#[tokio::test]
async fn test_issued_state_binds_only_its_own_tenant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_other"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (router, _) = app(config(&server));
    let (status, _, _) = send(
        &router,
        post_json("/get-auth-url", "tenant-1", &json!({"shopName": "test-shop"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // tenant-2 never began a flow in this process
    let body = signed_callback("auth-code-1", SHOP, API_SECRET);
    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-2", &body)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_callback_with_bad_hmac_never_reaches_shopify() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (router, store) = app(config(&server));

    let forged = signed_callback("auth-code-1", SHOP, "some-other-secret");
    let (status, _, response) =
        send(&router, post_json("/auth-callback", "tenant-1", &forged)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({"error": "HMAC verification failed"}));

    let mut tampered = signed_callback("auth-code-1", SHOP, API_SECRET);
    tampered["code"] = json!("auth-code-2");
    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-1", &tampered)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut not_hex = signed_callback("auth-code-1", SHOP, API_SECRET);
    not_hex["hmac"] = json!("zz-not-hex");
    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-1", &not_hex)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_callback_rejects_look_alike_shops() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (router, store) = app(config(&server));

    for shop in [
        "evil.com",
        "test-shop.myshopify.com.evil.com",
        "TEST_SHOP.myshopify.com",
        "test-shop.myshopify.com/",
    ] {
        // Correctly signed, so only the domain check can reject it
        let body = signed_callback("auth-code-1", shop, API_SECRET);
        let (status, _, response) =
            send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{shop}");
        assert!(response["error"].as_str().unwrap().contains("shop"), "{shop}");
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_callback_missing_parameters() {
    let server = MockServer::start().await;
    let (router, _) = app(config(&server));

    for missing in ["code", "shop", "hmac"] {
        let mut body = signed_callback("auth-code-1", SHOP, API_SECRET);
        body.as_object_mut().unwrap().remove(missing);
        let (status, _, response) =
            send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response["error"],
            format!("Missing required parameter: {missing}")
        );
    }

    let mut body = signed_callback("auth-code-1", SHOP, API_SECRET);
    body["code"] = json!("");
    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replayed_callback_is_exchanged_once_more_and_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_first",
            "scope": "read_orders"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "The authorization code was not found or was already used"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (router, store) = app(config(&server));
    let body = signed_callback("auth-code-1", SHOP, API_SECRET);

    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, response) = send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({"error": "Invalid authorization code or shop"}));

    // The first grant survives the rejected replay
    let profile = store.get(&TenantId::new("tenant-1")).await.unwrap();
    assert_eq!(profile.access_token.expose(), "shpat_first");
}

#[tokio::test]
async fn test_callback_without_token_in_response_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scope": "read_orders"})))
        .mount(&server)
        .await;

    let (router, store) = app(config(&server));
    let body = signed_callback("auth-code-1", SHOP, API_SECRET);

    let (status, _, response) = send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"], "Failed to retrieve access token");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_callback_signed_with_rotated_secret_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "shpat_rotated"
        })))
        .mount(&server)
        .await;

    let config = config_builder(&server)
        .old_api_secret_key(shop_connect::ApiSecretKey::new("previous-secret").unwrap())
        .build()
        .unwrap();
    let (router, _) = app(config);

    let body = signed_callback("auth-code-1", SHOP, "previous-secret");
    let (status, _, _) = send(&router, post_json("/auth-callback", "tenant-1", &body)).await;
    assert_eq!(status, StatusCode::OK);
}
