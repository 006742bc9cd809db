//! shop-connect server binary.
//!
//! Reads configuration from the environment (and `.env`, if present), then
//! serves the router until SIGINT or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use shop_connect::auth::JwtAuthenticator;
use shop_connect::store::InMemoryCredentialStore;
use shop_connect::{build_router, AppState, ShopConnectConfig};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_AUDIENCE: &str = "authenticated";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if env_var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside local development
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    let config = ShopConnectConfig::from_env().context("invalid configuration")?;
    if config.api_version().is_deprecated() {
        warn!(version = %config.api_version(), "configured Shopify API version is deprecated");
    }
    if config.redirect_uri().is_none() {
        warn!("SHOPIFY_REDIRECT_URI is not set; /get-auth-url will fail unless overrides are enabled");
    }
    info!(
        api_version = %config.api_version(),
        scopes = %config.scopes(),
        allowed_origin = config.allowed_origin(),
        proxied = config.api_host().is_some(),
        "configuration loaded"
    );

    let jwt_secret = env_var("AUTH_JWT_SECRET").context("AUTH_JWT_SECRET must be set")?;
    let audience = env_var("AUTH_JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_JWT_AUDIENCE.to_string());
    let authenticator = JwtAuthenticator::new(&jwt_secret, Some(audience.as_str()))?;

    // Process-local; tokens do not survive a restart
    let store = InMemoryCredentialStore::new();

    let state = AppState::new(config, Arc::new(store), Arc::new(authenticator))
        .context("failed to build HTTP client")?;
    let app = build_router(state)?;

    let listen_addr: SocketAddr = env_var("LISTEN_ADDR")
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
        .parse()
        .context("LISTEN_ADDR must be a socket address")?;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;

    info!(addr = %listen_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
