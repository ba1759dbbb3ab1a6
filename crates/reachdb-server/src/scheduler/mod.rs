//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring sweep that re-runs the refresh pipeline for recently-touched
//! profiles.

use std::sync::Arc;

use reachdb_pipeline::RefreshService;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    service: Arc<RefreshService>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_sweep_job(&scheduler, service).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the twice-daily profile sweep.
///
/// Runs at 00:00 and 12:00 UTC (`0 0 */12 * * *`). The sweep re-runs the
/// pipeline for every profile key with a snapshot captured in the lookback
/// window, at bounded concurrency, which both keeps tracked profiles warm
/// and throttles load on the external provider.
async fn register_sweep_job(
    scheduler: &JobScheduler,
    service: Arc<RefreshService>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 */12 * * *", move |_uuid, _lock| {
        let service = Arc::clone(&service);

        Box::pin(async move {
            tracing::info!("scheduler: starting profile sweep");
            service.sweep().await;
            tracing::info!("scheduler: profile sweep complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
