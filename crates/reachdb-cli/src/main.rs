use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::StreamExt;

use reachdb_pipeline::{JobState, RefreshConfig, RefreshService, StartOutcome};
use reachdb_provider::{ApifyClient, ProfileSource};
use reachdb_store::{PgStore, SnapshotStore};

#[derive(Debug, Parser)]
#[command(name = "reachdb-cli")]
#[command(about = "reachdb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one refresh to completion, printing progress checkpoints.
    Refresh {
        /// Profile key to refresh.
        key: String,
    },
    /// Print stored snapshot history for a profile key.
    History {
        key: String,
        /// Maximum number of snapshots to print.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the growth series for a profile key.
    Growth { key: String },
    /// Run the recently-touched-profiles sweep once.
    Sweep,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = reachdb_core::load_app_config()?;

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
        Arc::clone(&store),
        source,
        RefreshConfig::from_app_config(&config),
    ));

    match cli.command {
        Commands::Refresh { key } => refresh(&service, &key).await,
        Commands::History { key, limit } => history(&store, &key, limit).await,
        Commands::Growth { key } => growth(&service, &key).await,
        Commands::Sweep => {
            service.sweep().await;
            Ok(())
        }
    }
}

async fn refresh(service: &Arc<RefreshService>, key: &str) -> anyhow::Result<()> {
    match service.start(key) {
        StartOutcome::AlreadyRunning => {
            println!("a refresh for {key} is already running");
            return Ok(());
        }
        StartOutcome::AlreadyComplete => {
            println!("a completed result for {key} is still cached");
            return Ok(());
        }
        StartOutcome::Started => {}
    }

    let mut progress = Box::pin(service.progress_stream(key));
    while let Some(status) = progress.next().await {
        println!("[{:>3}%] {}", status.progress_percent, status.message);
    }

    match service.status(key) {
        Some(status) if status.state == JobState::Complete => {
            let result = service
                .result(key)
                .ok_or_else(|| anyhow::anyhow!("completed run produced no result"))?;
            println!(
                "{}: {} followers, {:.2}% avg engagement, {} posts, {} comments",
                result.profile.username,
                result.profile.followers,
                result.avg_engagement,
                result.posts.len(),
                result.comments.len()
            );
            println!(
                "sentiment: {:.1}% positive / {:.1}% neutral / {:.1}% negative",
                result.sentiment.positive, result.sentiment.neutral, result.sentiment.negative
            );
            Ok(())
        }
        Some(status) => anyhow::bail!("refresh failed: {}", status.message),
        None => anyhow::bail!("refresh record vanished before completion"),
    }
}

async fn history(
    store: &Arc<dyn SnapshotStore>,
    key: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let snapshots = store.history(key, limit).await?;
    if snapshots.is_empty() {
        println!("no snapshots stored for {key}");
        return Ok(());
    }
    for snapshot in snapshots {
        println!(
            "{}  followers={:<8} engagement={:>6.2}%  growth={:>+7.2}%",
            snapshot.captured_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.followers,
            snapshot.engagement_percent,
            snapshot.growth_percent
        );
    }
    Ok(())
}

async fn growth(service: &Arc<RefreshService>, key: &str) -> anyhow::Result<()> {
    let series = service.growth(key).await?;
    if series.is_empty() {
        println!("no growth history for {key}");
        return Ok(());
    }
    for point in series {
        println!(
            "{}  followers={:<8} engagement={:>6.2}%",
            point.captured_at.format("%Y-%m-%d %H:%M:%S"),
            point.followers,
            point.engagement_percent
        );
    }
    Ok(())
}
