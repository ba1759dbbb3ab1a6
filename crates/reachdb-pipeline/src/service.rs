//! Wiring of tracker, store, provider, and scorer into the refresh service.

use std::sync::Arc;

use chrono::Utc;
use futures::{Stream, StreamExt};
use reachdb_core::Snapshot;
use reachdb_provider::ProfileSource;
use reachdb_store::{SnapshotStore, StoreError};
use uuid::Uuid;

use crate::config::RefreshConfig;
use crate::executor;
use crate::freshness;
use crate::progress;
use crate::tracker::{schedule_eviction, JobTracker, StartDecision};
use crate::types::{JobResult, JobStatus, StartOutcome};

/// What a freshness-governed profile read produced.
#[derive(Debug)]
pub enum ProfileView {
    /// A snapshot younger than the freshness window; no provider call made.
    Fresh(Snapshot),
    /// No usable snapshot; a refresh was requested with this outcome.
    Refreshing(StartOutcome),
}

/// The collaborators one run works against, shared by every spawned task.
pub(crate) struct ServiceInner {
    pub(crate) tracker: Arc<JobTracker>,
    pub(crate) store: Arc<dyn SnapshotStore>,
    pub(crate) source: Arc<dyn ProfileSource>,
    pub(crate) config: RefreshConfig,
}

/// The refresh pipeline behind one cheaply-clonable process-wide handle.
///
/// Owns the job tracker and the collaborator handles; spawns one executor
/// task per started run and schedules the eviction reaper on every terminal
/// transition.
#[derive(Clone)]
pub struct RefreshService {
    inner: Arc<ServiceInner>,
}

impl RefreshService {
    #[must_use]
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        source: Arc<dyn ProfileSource>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                tracker: Arc::new(JobTracker::new()),
                store,
                source,
                config,
            }),
        }
    }

    /// Start a background refresh for `profile_key`.
    ///
    /// Atomic per key: while a run is active this returns
    /// [`StartOutcome::AlreadyRunning`]; while a cached result exists,
    /// [`StartOutcome::AlreadyComplete`]. Otherwise the run is spawned and
    /// drives itself to a terminal state — including the watchdog and the
    /// eviction reaper — without the caller waiting on it.
    pub fn start(&self, profile_key: &str) -> StartOutcome {
        match self.inner.tracker.begin(profile_key) {
            StartDecision::AlreadyRunning => StartOutcome::AlreadyRunning,
            StartDecision::AlreadyComplete => StartOutcome::AlreadyComplete,
            StartDecision::Begin(run_id) => {
                let inner = Arc::clone(&self.inner);
                let key = profile_key.to_string();
                tokio::spawn(async move {
                    drive(&inner, &key, run_id).await;
                });
                StartOutcome::Started
            }
        }
    }

    /// Run a refresh for `profile_key` to completion in the caller's task.
    ///
    /// Same exclusion rules as [`RefreshService::start`]; used by the sweep
    /// and the CLI, where bounding concurrency requires awaiting the run.
    pub async fn run_to_completion(&self, profile_key: &str) -> StartOutcome {
        match self.inner.tracker.begin(profile_key) {
            StartDecision::AlreadyRunning => StartOutcome::AlreadyRunning,
            StartDecision::AlreadyComplete => StartOutcome::AlreadyComplete,
            StartDecision::Begin(run_id) => {
                drive(&self.inner, profile_key, run_id).await;
                StartOutcome::Started
            }
        }
    }

    /// Pull-mode progress: the current status, or `None` after eviction (or
    /// for a key never started).
    #[must_use]
    pub fn status(&self, profile_key: &str) -> Option<JobStatus> {
        self.inner.tracker.status(profile_key)
    }

    /// The cached result of the last successful run, if it hasn't been
    /// evicted yet.
    #[must_use]
    pub fn result(&self, profile_key: &str) -> Option<Arc<JobResult>> {
        self.inner.tracker.result(profile_key)
    }

    /// Push-mode progress: one status snapshot per second until terminal.
    ///
    /// An unknown key yields an immediately-empty stream.
    pub fn progress_stream(
        &self,
        profile_key: &str,
    ) -> impl Stream<Item = JobStatus> + Send + 'static {
        progress::status_stream(self.inner.tracker.subscribe(profile_key))
    }

    /// Freshness-governed read: serve the latest snapshot when it is inside
    /// the freshness window, otherwise kick off a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the latest-snapshot lookup fails.
    pub async fn profile_view(&self, profile_key: &str) -> Result<ProfileView, StoreError> {
        if let Some(latest) = self.inner.store.latest(profile_key).await? {
            if freshness::is_fresh(
                latest.captured_at,
                Utc::now(),
                self.inner.config.freshness_window,
            ) {
                return Ok(ProfileView::Fresh(latest));
            }
        }
        Ok(ProfileView::Refreshing(self.start(profile_key)))
    }

    /// Growth series for a key from stored history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the history lookup fails.
    pub async fn growth(
        &self,
        profile_key: &str,
    ) -> Result<Vec<reachdb_core::GrowthPoint>, StoreError> {
        let history = self
            .inner
            .store
            .history(profile_key, freshness::GROWTH_SERIES_LEN)
            .await?;
        Ok(freshness::growth_series(&history))
    }

    /// Re-run the pipeline for every key touched inside the sweep lookback
    /// window, at most `sweep_concurrency` at a time.
    ///
    /// Keys with an active run are skipped by the tracker's exclusion; a
    /// store failure aborts the sweep with an error log.
    pub async fn sweep(&self) {
        let since = Utc::now() - self.inner.config.sweep_lookback;
        let keys = match self.inner.store.recent_keys(since).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(error = %e, "sweep: failed to list recently-touched keys");
                return;
            }
        };

        if keys.is_empty() {
            tracing::info!("sweep: no recently-touched profiles; skipping");
            return;
        }
        tracing::info!(count = keys.len(), "sweep: refreshing recently-touched profiles");

        futures::stream::iter(keys.into_iter().map(|key| {
            let service = self.clone();
            async move {
                let outcome = service.run_to_completion(&key).await;
                tracing::debug!(key = %key, ?outcome, "sweep: profile refresh finished");
            }
        }))
        .buffer_unordered(self.inner.config.sweep_concurrency.max(1))
        .collect::<Vec<()>>()
        .await;

        tracing::info!("sweep: complete");
    }
}

/// Run one refresh to its terminal state and arm the eviction reaper.
async fn drive(inner: &Arc<ServiceInner>, profile_key: &str, run_id: Uuid) {
    executor::execute(inner, profile_key, run_id).await;
    // Every run ends terminal (complete, failed, or watchdog-failed), so
    // each run schedules its reaper exactly once.
    schedule_eviction(
        Arc::clone(&inner.tracker),
        profile_key.to_string(),
        run_id,
        inner.config.result_ttl,
    );
}
