use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub provider_token: String,
    pub provider_base_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub provider_request_timeout_secs: u64,
    pub provider_poll_interval_secs: u64,
    pub provider_max_retries: u32,
    pub provider_retry_backoff_base_ms: u64,
    pub post_limit: usize,
    pub comment_limit: usize,
    pub freshness_window_hours: i64,
    pub profile_stage_timeout_secs: u64,
    pub comments_stage_timeout_secs: u64,
    pub run_timeout_secs: u64,
    pub result_ttl_secs: u64,
    pub sweep_concurrency: usize,
    pub sweep_lookback_hours: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("provider_token", &"[redacted]")
            .field("provider_base_url", &self.provider_base_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "provider_request_timeout_secs",
                &self.provider_request_timeout_secs,
            )
            .field(
                "provider_poll_interval_secs",
                &self.provider_poll_interval_secs,
            )
            .field("provider_max_retries", &self.provider_max_retries)
            .field(
                "provider_retry_backoff_base_ms",
                &self.provider_retry_backoff_base_ms,
            )
            .field("post_limit", &self.post_limit)
            .field("comment_limit", &self.comment_limit)
            .field("freshness_window_hours", &self.freshness_window_hours)
            .field(
                "profile_stage_timeout_secs",
                &self.profile_stage_timeout_secs,
            )
            .field(
                "comments_stage_timeout_secs",
                &self.comments_stage_timeout_secs,
            )
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("result_ttl_secs", &self.result_ttl_secs)
            .field("sweep_concurrency", &self.sweep_concurrency)
            .field("sweep_lookback_hours", &self.sweep_lookback_hours)
            .finish()
    }
}
