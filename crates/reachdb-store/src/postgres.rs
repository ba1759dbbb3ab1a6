//! Postgres-backed snapshot store over the `profile_snapshots` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reachdb_core::{ProfileBundle, Snapshot};
use sqlx::PgPool;

use crate::{SnapshotStore, StoreError};

/// A row from the `profile_snapshots` table.
///
/// `profile_data` holds the serialized [`ProfileBundle`] (profile + posts);
/// `comments` and `sentiment` hold their respective serialized forms.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SnapshotRow {
    profile_key: String,
    captured_at: DateTime<Utc>,
    engagement_percent: f64,
    growth_percent: f64,
    followers: i64,
    profile_data: serde_json::Value,
    comments: serde_json::Value,
    sentiment: serde_json::Value,
}

const SNAPSHOT_COLUMNS: &str = "profile_key, captured_at, engagement_percent, growth_percent, \
     followers, profile_data, comments, sentiment";

impl SnapshotRow {
    fn into_snapshot(self) -> Result<Snapshot, StoreError> {
        let bundle: ProfileBundle = serde_json::from_value(self.profile_data)?;
        Ok(Snapshot {
            profile_key: self.profile_key,
            captured_at: self.captured_at,
            profile: bundle.profile,
            posts: bundle.posts,
            engagement_percent: self.engagement_percent,
            growth_percent: self.growth_percent,
            followers: self.followers,
            comments: serde_json::from_value(self.comments)?,
            sentiment: serde_json::from_value(self.sentiment)?,
        })
    }
}

/// Snapshot store backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgStore {
    async fn append(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let bundle = serde_json::to_value(ProfileBundle {
            profile: snapshot.profile.clone(),
            posts: snapshot.posts.clone(),
        })?;
        let comments = serde_json::to_value(&snapshot.comments)?;
        let sentiment = serde_json::to_value(snapshot.sentiment)?;

        sqlx::query(
            "INSERT INTO profile_snapshots \
                 (profile_key, captured_at, engagement_percent, growth_percent, \
                  followers, profile_data, comments, sentiment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (profile_key, captured_at) DO UPDATE SET \
                 engagement_percent = EXCLUDED.engagement_percent, \
                 growth_percent     = EXCLUDED.growth_percent, \
                 followers          = EXCLUDED.followers, \
                 profile_data       = EXCLUDED.profile_data, \
                 comments           = EXCLUDED.comments, \
                 sentiment          = EXCLUDED.sentiment",
        )
        .bind(&snapshot.profile_key)
        .bind(snapshot.captured_at)
        .bind(snapshot.engagement_percent)
        .bind(snapshot.growth_percent)
        .bind(snapshot.followers)
        .bind(bundle)
        .bind(comments)
        .bind(sentiment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest(&self, profile_key: &str) -> Result<Option<Snapshot>, StoreError> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} \
             FROM profile_snapshots \
             WHERE profile_key = $1 \
             ORDER BY captured_at DESC \
             LIMIT 1"
        ))
        .bind(profile_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SnapshotRow::into_snapshot).transpose()
    }

    async fn history(&self, profile_key: &str, limit: usize) -> Result<Vec<Snapshot>, StoreError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} \
             FROM profile_snapshots \
             WHERE profile_key = $1 \
             ORDER BY captured_at DESC \
             LIMIT $2"
        ))
        .bind(profile_key)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SnapshotRow::into_snapshot).collect()
    }

    async fn recent_keys(&self, since: DateTime<Utc>) -> Result<Vec<String>, StoreError> {
        Ok(sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT profile_key \
             FROM profile_snapshots \
             WHERE captured_at > $1 \
             ORDER BY profile_key",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }
}
