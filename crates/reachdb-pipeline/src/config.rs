//! Tunables for the refresh pipeline.

use std::time::Duration;

/// Pipeline tunables with the production defaults baked in.
///
/// The defaults mirror the documented stage budgets: 120s profile fetch,
/// 90s comments fetch, 600s whole-run watchdog, 300s terminal-record TTL,
/// 12h freshness window, and a sweep over keys touched in the last 24h at
/// concurrency 5.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Posts requested per profile fetch.
    pub post_limit: usize,
    /// Comments requested per comments fetch.
    pub comment_limit: usize,
    /// How many leading posts contribute their URL to the comments fetch.
    pub comment_source_posts: usize,
    /// Snapshots younger than this are served without a refresh.
    pub freshness_window: chrono::Duration,
    pub profile_stage_timeout: Duration,
    pub comments_stage_timeout: Duration,
    /// Global watchdog for one run.
    pub run_timeout: Duration,
    /// How long terminal job records and results linger before eviction.
    pub result_ttl: Duration,
    pub sweep_concurrency: usize,
    pub sweep_lookback: chrono::Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            post_limit: 10,
            comment_limit: 5,
            comment_source_posts: 5,
            freshness_window: chrono::Duration::hours(12),
            profile_stage_timeout: Duration::from_secs(120),
            comments_stage_timeout: Duration::from_secs(90),
            run_timeout: Duration::from_secs(600),
            result_ttl: Duration::from_secs(300),
            sweep_concurrency: 5,
            sweep_lookback: chrono::Duration::hours(24),
        }
    }
}

impl RefreshConfig {
    /// Build pipeline tunables from the application config.
    #[must_use]
    pub fn from_app_config(config: &reachdb_core::AppConfig) -> Self {
        Self {
            post_limit: config.post_limit,
            comment_limit: config.comment_limit,
            comment_source_posts: 5,
            freshness_window: chrono::Duration::hours(config.freshness_window_hours),
            profile_stage_timeout: Duration::from_secs(config.profile_stage_timeout_secs),
            comments_stage_timeout: Duration::from_secs(config.comments_stage_timeout_secs),
            run_timeout: Duration::from_secs(config.run_timeout_secs),
            result_ttl: Duration::from_secs(config.result_ttl_secs),
            sweep_concurrency: config.sweep_concurrency,
            sweep_lookback: chrono::Duration::hours(config.sweep_lookback_hours),
        }
    }
}
