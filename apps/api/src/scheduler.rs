//! Background job scheduler.
//!
//! Registers the daily-digest pass, which fires hourly by default and lets each
//! investor's preferred hour decide who is due.

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::digest::batch::run_digest_batch;
use crate::state::AppState;

/// Builds and starts the background job scheduler.
///
/// The returned [`JobScheduler`] must be kept alive for the lifetime of the
/// process; dropping it shuts down all jobs.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_digest_job(&scheduler, state).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_digest_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let cron = state.config.digest_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting daily digest pass");
            if let Err(e) = run_digest_batch(
                state.run_guard.as_ref(),
                state.store.as_ref(),
                state.notifier.as_ref(),
                &state.config.dashboard_url,
                Utc::now(),
            )
            .await
            {
                tracing::error!(error = %e, "scheduler: daily digest pass failed");
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered daily digest job");
    Ok(())
}
