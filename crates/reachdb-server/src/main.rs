mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use reachdb_pipeline::{RefreshConfig, RefreshService};
use reachdb_provider::{ApifyClient, ProfileSource};
use reachdb_store::{PgStore, SnapshotStore};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(reachdb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = reachdb_store::PoolConfig::from_app_config(&config);
    let pool = reachdb_store::connect_pool(&config.database_url, pool_config).await?;
    reachdb_store::run_migrations(&pool).await?;
    let store: Arc<dyn SnapshotStore> = Arc::new(PgStore::new(pool));

    let source: Arc<dyn ProfileSource> = Arc::new(
        ApifyClient::with_base_url(
            &config.provider_token,
            config.provider_request_timeout_secs,
            &config.provider_base_url,
        )?
        .with_poll_interval(Duration::from_secs(config.provider_poll_interval_secs))
        .with_retry(
            config.provider_max_retries,
            config.provider_retry_backoff_base_ms,
        ),
    );

    let service = Arc::new(RefreshService::new(
        store,
        source,
        RefreshConfig::from_app_config(&config),
    ));

    let _scheduler = scheduler::build_scheduler(Arc::clone(&service)).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        reachdb_core::Environment::Development
    ))?;
    let app = build_app(AppState { service }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "reachdb-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
