//! Policy X-Ray REST API Server
//!
//! ## Usage
//!
//! ```bash
//! BLOCKFROST_PROJECT_ID=mainnet... cargo run --bin xray_server --features server
//!
//! # With a persistent verdict cache
//! DATABASE_URL=postgresql://localhost/xray \
//!   cargo run --bin xray_server --features server,database
//!
//! curl http://localhost:8000/xray/{policy_id}
//! curl http://localhost:8000/api/metrics
//! curl http://localhost:8000/api/health
//! ```

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use policy_xray::api::create_xray_router;
use policy_xray::{InMemoryVerdictStore, PolicyAnalyzer, VerdictStore, XrayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = XrayConfig::from_env().context("failed to load configuration")?;
    info!(?config, "starting policy X-Ray server");

    let store = verdict_store(&config).await?;
    let analyzer = PolicyAnalyzer::from_config(&config, store)?;
    if !analyzer.is_live() {
        warn!("BLOCKFROST_PROJECT_ID not set, every analysis returns the fallback verdict");
    }

    let app = create_xray_router(Arc::new(analyzer))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "database")]
async fn verdict_store(config: &XrayConfig) -> anyhow::Result<Arc<dyn VerdictStore>> {
    match &config.database_url {
        Some(url) => {
            let store = policy_xray::PgVerdictStore::connect(url)
                .await
                .context("failed to open verdict store")?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryVerdictStore::new())),
    }
}

#[cfg(not(feature = "database"))]
async fn verdict_store(config: &XrayConfig) -> anyhow::Result<Arc<dyn VerdictStore>> {
    if config.database_url.is_some() {
        warn!("DATABASE_URL set but the `database` feature is disabled, using in-memory cache");
    }
    Ok(Arc::new(InMemoryVerdictStore::new()))
}
