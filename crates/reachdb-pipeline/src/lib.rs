//! The background refresh pipeline for reachdb.
//!
//! A refresh for one profile key runs as an independently spawned task
//! driving a fixed stage sequence — fetch profile, fetch comments, score
//! sentiment, compute growth, persist, publish — with per-stage timeouts and
//! a global watchdog. The [`tracker::JobTracker`] keeps the process-wide
//! registry of job statuses and cached results, enforcing at-most-one active
//! run per key; the [`service::RefreshService`] wires the tracker to the
//! snapshot store, the data provider, and the sentiment scorer.
//!
//! Progress is observable two ways: a single status read, or a push stream
//! emitting one consistent [`types::JobStatus`] snapshot per second until the
//! run reaches a terminal state. Terminal records linger for a TTL (default
//! 300s) and are then evicted; afterwards the key looks like it was never
//! refreshed.

pub mod config;
pub mod error;
pub mod freshness;
pub mod service;
pub mod testing;
pub mod tracker;
pub mod types;

mod executor;
mod progress;

pub use config::RefreshConfig;
pub use error::PipelineError;
pub use service::{ProfileView, RefreshService};
pub use tracker::JobTracker;
pub use types::{JobResult, JobState, JobStatus, StartOutcome};
