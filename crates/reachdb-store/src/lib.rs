//! Snapshot persistence for reachdb.
//!
//! The [`SnapshotStore`] trait is the contract the pipeline writes through:
//! append-only, timestamped snapshots, unique on `(profile_key, captured_at)`,
//! queried newest-first. Two implementations are provided:
//!
//! - [`MemoryStore`] — in-process, used by tests and local development.
//! - [`PgStore`] — Postgres via sqlx, backed by the `profile_snapshots`
//!   table created by the workspace `migrations/` directory.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reachdb_core::Snapshot;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/reachdb-store/Cargo.toml; resolves to
// <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &reachdb_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("snapshot blob serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Contract for the append-only snapshot history.
///
/// Implementations must keep `(profile_key, captured_at)` unique — a second
/// `append` with the same pair replaces the earlier record rather than
/// erroring — and must return history newest-first.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist one snapshot, upserting on `(profile_key, captured_at)`.
    async fn append(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// The most recent snapshot for `profile_key`, if any.
    async fn latest(&self, profile_key: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Up to `limit` snapshots for `profile_key`, newest-first.
    async fn history(&self, profile_key: &str, limit: usize) -> Result<Vec<Snapshot>, StoreError>;

    /// Distinct profile keys with at least one snapshot captured after `since`.
    async fn recent_keys(&self, since: DateTime<Utc>) -> Result<Vec<String>, StoreError>;
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect to a Postgres pool, reading `DATABASE_URL` from env.
///
/// # Errors
///
/// Returns [`StoreError::MissingDatabaseUrl`] if `DATABASE_URL` is unset, or
/// [`StoreError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool_from_env() -> Result<PgPool, StoreError> {
    let database_url = env::var("DATABASE_URL").map_err(|_| StoreError::MissingDatabaseUrl)?;
    connect_pool(&database_url, PoolConfig::default())
        .await
        .map_err(StoreError::from)
}

/// Run all pending migrations against the pool.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
