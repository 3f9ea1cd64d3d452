mod config;
mod db;
mod digest;
mod errors;
mod investors;
mod matching;
mod models;
mod notify;
mod routes;
mod scheduler;
mod startups;
mod state;
mod store;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::matching::redis_guard::RedisRunGuard;
use crate::notify::ses::{build_ses_client, SesNotifier};
use crate::routes::build_router;
use crate::scheduler::build_scheduler;
use crate::state::AppState;
use crate::store::postgres::PgProfileStore;

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

    info!("Starting Dealflow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (profile store)
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    let store = Arc::new(PgProfileStore::new(pool));

    // Initialize Redis (run guard)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let run_guard = Arc::new(RedisRunGuard::new(redis, config.run_lock_ttl_secs));
    info!("Redis run guard initialized (ttl {}s)", config.run_lock_ttl_secs);

    // Initialize SES (notifier)
    let ses = build_ses_client(&config).await;
    let notifier = Arc::new(SesNotifier::new(ses, config.sender_email.clone()));
    info!("SES notifier initialized (sender: {})", config.sender_email);

    let state = AppState {
        store,
        notifier,
        run_guard,
        config: config.clone(),
    };

    // Keep the handle alive for the lifetime of the process
    let _scheduler = build_scheduler(state.clone())
        .await
        .map_err(|e| anyhow::anyhow!("failed to start scheduler: {e:?}"))?;
    info!("Scheduler started (digest cron: {})", config.digest_cron);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
