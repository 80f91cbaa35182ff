mod auth;
mod backend;
mod capsules;
mod config;
mod dates;
mod db;
mod errors;
mod extract;
mod models;
mod nav;
mod notice;
mod profiles;
mod rewards;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::GoTrueProvider;
use crate::backend::{Backend, MemoryBackend, PgBackend};
use crate::config::{BackendKind, Config};
use crate::db::{create_pool, run_migrations};
use crate::profiles::AvatarResolver;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting TimeSeal API v{}", env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn Backend> = match config.backend {
        BackendKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(url).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            Arc::new(PgBackend::new(pool))
        }
        BackendKind::Memory => {
            warn!("Using in-memory backend; data is lost on restart");
            Arc::new(MemoryBackend::new())
        }
    };

    let auth = Arc::new(GoTrueProvider::new(
        &config.supabase_url,
        &config.supabase_anon_key,
        &config.supabase_jwt_secret,
    )?);
    info!("Auth provider initialized ({})", config.supabase_url);

    let avatars = AvatarResolver::new(
        &config.avatar_fallback_url,
        Duration::from_millis(config.avatar_probe_timeout_ms),
    )?;

    let state = AppState {
        backend,
        auth,
        avatars,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
