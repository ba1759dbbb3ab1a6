//! Process-wide registry of refresh jobs and cached results.
//!
//! One mutex guards both maps so `begin` is a true atomic check-and-insert:
//! two concurrent starts for the same key can never both see "no active
//! run". Status updates go through [`JobTracker::checkpoint`] and are
//! published as whole-record clones over a per-job watch channel, so readers
//! never observe a half-updated record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::types::{JobResult, JobState, JobStatus};

/// What `begin` decided for a key.
#[derive(Debug)]
pub enum StartDecision {
    /// A fresh run record was inserted; the caller owns driving this run id.
    Begin(Uuid),
    AlreadyRunning,
    AlreadyComplete,
}

struct JobEntry {
    run_id: Uuid,
    status: JobStatus,
    tx: watch::Sender<JobStatus>,
}

#[derive(Default)]
struct Registry {
    jobs: HashMap<String, JobEntry>,
    results: HashMap<String, Arc<JobResult>>,
}

/// Registry of job statuses and results, keyed by profile key.
#[derive(Default)]
pub struct JobTracker {
    inner: Mutex<Registry>,
}

impl JobTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check-and-insert a run for `profile_key`.
    ///
    /// Returns [`StartDecision::AlreadyRunning`] while a queued or running
    /// record exists, [`StartDecision::AlreadyComplete`] while a cached
    /// result exists, and otherwise inserts a fresh `Queued` record —
    /// replacing a lingering `Failed` one, whose reaper is disarmed by the
    /// run-id guard in [`JobTracker::evict`].
    pub fn begin(&self, profile_key: &str) -> StartDecision {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = inner.jobs.get(profile_key) {
            if !entry.status.state.is_terminal() {
                return StartDecision::AlreadyRunning;
            }
        }
        if inner.results.contains_key(profile_key) {
            return StartDecision::AlreadyComplete;
        }

        let run_id = Uuid::new_v4();
        let status = JobStatus {
            profile_key: profile_key.to_string(),
            state: JobState::Queued,
            progress_percent: 0,
            message: "Queued".to_string(),
            created_at: Utc::now(),
        };
        let (tx, _rx) = watch::channel(status.clone());
        inner.jobs.insert(
            profile_key.to_string(),
            JobEntry {
                run_id,
                status,
                tx,
            },
        );
        StartDecision::Begin(run_id)
    }

    /// Current status for a key, if any.
    pub fn status(&self, profile_key: &str) -> Option<JobStatus> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.jobs.get(profile_key).map(|entry| entry.status.clone())
    }

    /// Cached result for a key, if any.
    pub fn result(&self, profile_key: &str) -> Option<Arc<JobResult>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.results.get(profile_key).cloned()
    }

    /// Subscribe to status updates for a key. `None` when the job is unknown.
    pub fn subscribe(&self, profile_key: &str) -> Option<watch::Receiver<JobStatus>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.jobs.get(profile_key).map(|entry| entry.tx.subscribe())
    }

    /// Record a progress checkpoint for a run.
    ///
    /// Ignored for a stale run id, after a terminal state, or when it would
    /// decrease `progress_percent` — progress is non-decreasing within a run.
    pub fn checkpoint(&self, profile_key: &str, run_id: Uuid, progress_percent: u8, message: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = inner.jobs.get_mut(profile_key) else {
            return;
        };
        if entry.run_id != run_id
            || entry.status.state.is_terminal()
            || progress_percent < entry.status.progress_percent
        {
            return;
        }
        entry.status.state = JobState::Running;
        entry.status.progress_percent = progress_percent;
        entry.status.message = message.to_string();
        entry.tx.send_replace(entry.status.clone());
    }

    /// Transition a run to `Complete` and cache its result.
    ///
    /// Returns `false` (and drops the result) for a stale run id or a record
    /// already in a terminal state, so a run reaches terminal at most once.
    pub fn complete(&self, profile_key: &str, run_id: Uuid, result: JobResult) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = inner.jobs.get_mut(profile_key) else {
            return false;
        };
        if entry.run_id != run_id || entry.status.state.is_terminal() {
            return false;
        }
        entry.status.state = JobState::Complete;
        entry.status.progress_percent = 100;
        entry.status.message = "Profile analysis complete!".to_string();
        entry.tx.send_replace(entry.status.clone());
        inner
            .results
            .insert(profile_key.to_string(), Arc::new(result));
        true
    }

    /// Transition a run to `Failed` with a descriptive message.
    ///
    /// Returns `false` for a stale run id or an already-terminal record.
    pub fn fail(&self, profile_key: &str, run_id: Uuid, message: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = inner.jobs.get_mut(profile_key) else {
            return false;
        };
        if entry.run_id != run_id || entry.status.state.is_terminal() {
            return false;
        }
        entry.status.state = JobState::Failed;
        entry.status.progress_percent = 100;
        entry.status.message = message.to_string();
        entry.tx.send_replace(entry.status.clone());
        true
    }

    /// Remove the status and result for a key, if `run_id` still owns it.
    ///
    /// The run-id guard keeps a reaper scheduled for a superseded run from
    /// evicting its successor's records.
    pub fn evict(&self, profile_key: &str, run_id: Uuid) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let owned = inner
            .jobs
            .get(profile_key)
            .is_some_and(|entry| entry.run_id == run_id);
        if !owned {
            return false;
        }
        inner.jobs.remove(profile_key);
        inner.results.remove(profile_key);
        true
    }
}

/// Spawn the one-shot reaper for a terminal run.
///
/// Called exactly once per terminal transition; after `ttl` the job's
/// status and result vanish and the key behaves as never-refreshed.
pub fn schedule_eviction(tracker: Arc<JobTracker>, profile_key: String, run_id: Uuid, ttl: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if tracker.evict(&profile_key, run_id) {
            tracing::debug!(key = %profile_key, "evicted terminal job record");
        }
    });
}
