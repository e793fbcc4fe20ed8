//! Background polling.
//!
//! Registers one repeated job that re-acquires parking data at the default
//! coordinate so the last-known snapshot stays warm between API calls.

use std::sync::Arc;
use std::time::Duration;

use parkwatch_core::AppConfig;
use parkwatch_feed::{AcquireMode, DataOrigin, FileStore, Pipeline};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down the polling job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pipeline: Arc<Mutex<Pipeline<FileStore>>>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_poll_job(&scheduler, pipeline, config).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_poll_job(
    scheduler: &JobScheduler,
    pipeline: Arc<Mutex<Pipeline<FileStore>>>,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let every = Duration::from_secs(config.refresh_interval_secs);

    let job_config = Arc::clone(&config);
    let job = Job::new_repeated_async(every, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);
        let config = Arc::clone(&job_config);

        Box::pin(async move {
            let mut pipeline = pipeline.lock().await;
            let acquisition = pipeline
                .acquire_with(config.default_lat, config.default_lon, AcquireMode::Normal)
                .await;
            match &acquisition.origin {
                DataOrigin::Live { adapter } => tracing::debug!(
                    adapter = %adapter,
                    records = acquisition.records.len(),
                    "scheduler: poll complete"
                ),
                DataOrigin::Cache { age_ms } => tracing::info!(
                    age_ms,
                    records = acquisition.records.len(),
                    "scheduler: poll served from cache"
                ),
                DataOrigin::Empty => tracing::warn!("scheduler: poll returned no data"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = config.refresh_interval_secs,
        "scheduler: registered parking poll job"
    );
    Ok(())
}
