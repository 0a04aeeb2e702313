mod api_keys;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod vault;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_keys::store::PgApiKeyStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vault::{CipherSuite, VaultCodec};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize credential vault (VAULT_SECRET is consumed here and never logged)
    let suite = CipherSuite::with_iterations(config.vault_kdf_iterations);
    let vault = VaultCodec::new(config.vault_secret, suite).context("Invalid vault configuration")?;
    info!(
        "Credential vault initialized ({}, {} PBKDF2 rounds)",
        suite.cipher.as_str(),
        suite.kdf_iterations
    );

    // Build app state
    let state = AppState {
        api_keys: Arc::new(PgApiKeyStore::new(db)),
        vault,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the frontend origin once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
