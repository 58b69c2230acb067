//! Poll a job until it reaches a terminal state.

use tokio::time::sleep;

use crate::blackbox::client::BlackboxApi;
use crate::blackbox::types::{JobInfo, PollingStrategy};
use crate::cancel::CancelToken;
use crate::error::{SdkError, SdkResult};

/// Fetch a job's status until it is terminal, bounded by the strategy's
/// attempt budget and interruptible through the cancel token.
///
/// `on_progress` fires on every fetch, including the first and the terminal
/// one. A job that is already terminal on the first fetch returns after
/// exactly one call with no sleep. The returned job is whatever terminal
/// record the service reported; a `failed` job is not converted into an
/// error here so callers can read its `error` field verbatim.
pub async fn poll_until_complete(
    api: &dyn BlackboxApi,
    job_id: &str,
    strategy: &PollingStrategy,
    on_progress: Option<&(dyn Fn(&JobInfo) + Send + Sync)>,
    cancel: &CancelToken,
) -> SdkResult<JobInfo> {
    let mut attempts: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(SdkError::Aborted);
        }

        let job = api.job_status(job_id).await?;
        if let Some(callback) = on_progress {
            callback(&job);
        }

        if job.status.is_terminal() {
            tracing::debug!(job_id = %job.id, status = ?job.status, "job reached terminal state");
            return Ok(job);
        }

        attempts += 1;
        if attempts >= strategy.max_attempts {
            return Err(SdkError::PollTimeout {
                subject: job_id.to_string(),
                attempts,
            });
        }

        tracing::debug!(
            job_id = %job.id,
            status = ?job.status,
            progress = job.progress,
            attempt = attempts,
            "job still pending"
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(SdkError::Aborted),
            _ = sleep(strategy.interval_for(attempts - 1)) => {}
        }
    }
}
