//! Job-control types: status records, results, and start outcomes.

use chrono::{DateTime, Utc};
use reachdb_core::{Comment, GrowthPoint, Post, RawProfile, SentimentBreakdown};
use serde::Serialize;

/// Lifecycle of one refresh run.
///
/// `Queued → Running → {Complete, Failed}`; the terminal states persist until
/// the reaper evicts the record. There is no transition out of a terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Complete,
    Failed,
}

impl JobState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "queued"),
            JobState::Running => write!(f, "running"),
            JobState::Complete => write!(f, "complete"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Point-in-time view of one refresh job.
///
/// Updated atomically as a unit per checkpoint; readers never see a record
/// with fields from two different checkpoints.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub profile_key: String,
    pub state: JobState,
    pub progress_percent: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of asking the tracker to start a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    /// A new run was inserted and spawned.
    Started,
    /// An active (queued or running) run already exists for the key.
    AlreadyRunning,
    /// A cached result already exists for the key; no run was started.
    AlreadyComplete,
}

/// The in-memory product of one successful refresh run.
///
/// Cached by the tracker until the reaper evicts it alongside the job
/// status. Served even when snapshot persistence failed.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub profile: RawProfile,
    pub posts: Vec<Post>,
    pub sentiment: SentimentBreakdown,
    pub growth: Vec<GrowthPoint>,
    pub avg_engagement: f64,
    pub comments: Vec<Comment>,
}
