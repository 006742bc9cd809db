//! The HTTP surface of the service.
//!
//! Three authenticated JSON endpoints plus a health probe:
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /get-auth-url` | builds the authorization redirect |
//! | `POST /auth-callback` | verifies a callback and stores the token |
//! | `POST /fetch-orders` | returns one page of the tenant's orders |
//! | `GET /health` | liveness |
//!
//! Every response carries CORS headers for the configured origin. The CORS
//! layer answers every `OPTIONS` request itself with 200 and an empty body,
//! so no route declares one. Errors are rendered as `{"error": "<message>"}`
//! with the status of their kind.

mod error;
mod extract;
mod handlers;

pub use extract::{AuthenticatedTenant, ValidatedJson};
pub use handlers::{
    AuthCallbackResponse, AuthUrlRequest, AuthUrlResponse, FetchOrdersRequest, HealthResponse,
};

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::oauth::PendingStates;
use crate::auth::Authenticator;
use crate::clients::HttpClient;
use crate::config::ShopConnectConfig;
use crate::error::ConfigError;
use crate::store::CredentialStore;

const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Process-wide state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Immutable configuration.
    pub config: Arc<ShopConnectConfig>,
    /// The single outbound HTTP client.
    pub http: Arc<HttpClient>,
    /// Tenant credential persistence.
    pub store: Arc<dyn CredentialStore>,
    /// Bearer token validation.
    pub authenticator: Arc<dyn Authenticator>,
    /// OAuth states issued by `/get-auth-url`, awaiting their callback.
    pub pending_states: Arc<PendingStates>,
}

impl AppState {
    /// Bundles the collaborators, building the HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::clients::HttpError`] if the HTTP client cannot be
    /// built.
    pub fn new(
        config: ShopConnectConfig,
        store: Arc<dyn CredentialStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self, crate::clients::HttpError> {
        let http = HttpClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            http: Arc::new(http),
            store,
            authenticator,
            pending_states: Arc::new(PendingStates::new()),
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

/// Builds the router with CORS and request tracing applied.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSetting`] if the configured origin is not
/// a valid header value.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use shop_connect::auth::JwtAuthenticator;
/// use shop_connect::server::{build_router, AppState};
/// use shop_connect::store::InMemoryCredentialStore;
/// use shop_connect::{ApiKey, ApiSecretKey, ShopConnectConfig};
///
/// let config = ShopConnectConfig::builder()
///     .api_key(ApiKey::new("key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .build()
///     .unwrap();
/// let state = AppState::new(
///     config,
///     Arc::new(InMemoryCredentialStore::new()),
///     Arc::new(JwtAuthenticator::new("jwt-secret", None).unwrap()),
/// )
/// .unwrap();
///
/// let router = build_router(state).unwrap();
/// # drop(router);
/// ```
pub fn build_router(state: AppState) -> Result<Router, ConfigError> {
    let cors = cors_layer(state.config.allowed_origin())?;

    Ok(Router::new()
        .route("/get-auth-url", post(handlers::get_auth_url))
        .route("/auth-callback", post(handlers::auth_callback))
        .route("/fetch-orders", post(handlers::fetch_orders))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = if allowed_origin == "*" {
        AllowOrigin::from(Any)
    } else {
        let value =
            HeaderValue::from_str(allowed_origin).map_err(|e| ConfigError::InvalidSetting {
                field: "ALLOWED_ORIGIN",
                reason: e.to_string(),
            })?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .max_age(CORS_MAX_AGE))
}
