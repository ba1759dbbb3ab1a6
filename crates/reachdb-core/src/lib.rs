//! Shared domain types and configuration for reachdb.
//!
//! Every other crate in the workspace depends on this one: the snapshot and
//! profile types persisted by `reachdb-store`, the normalized provider output
//! produced by `reachdb-provider`, and the env-driven [`AppConfig`] consumed
//! by the server and CLI binaries.

mod app_config;
mod config;
mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use types::{
    Comment, GrowthPoint, Post, ProfileBundle, RawProfile, SentimentBreakdown, Snapshot,
};
