//! File encryption/decryption flows: submit an authenticated job to the
//! Blackbox, poll it to completion, download the output.

use serde::Serialize;

use crate::blackbox::client::JobRequest;
use crate::blackbox::poller::poll_until_complete;
use crate::blackbox::types::{JobInfo, JobStatus, JobType};
use crate::context::FlowContext;
use crate::error::{SdkError, SdkResult};
use crate::flow::runner::StepRunner;
use crate::flow::types::{FlowMode, FlowOptions, FlowPlan, FlowResult, FlowStep, StepType};
use crate::freshness::auth::build_auth;
use crate::freshness::guard::with_block_fresh_retry;

#[derive(Debug, Clone)]
pub struct FileJobParams {
    /// Secret whose key material the Blackbox uses.
    pub secret_id: String,
    /// Plaintext for encrypt jobs, cifer payload for decrypt jobs.
    pub data: Vec<u8>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileJobData {
    pub job: JobInfo,
    /// Absent when the job produced no retrievable output file.
    pub output: Option<Vec<u8>>,
}

fn plan(job_type: JobType) -> FlowPlan {
    let (name, description) = match job_type {
        JobType::Encrypt => ("encrypt_file", "Encrypt a file through the Blackbox"),
        JobType::Decrypt => ("decrypt_file", "Decrypt a file through the Blackbox"),
    };
    FlowPlan {
        name,
        description,
        steps: vec![
            FlowStep::new(
                "request_job",
                "Sign authentication material and submit the job",
                StepType::ApiCall,
            ),
            FlowStep::new("wait_job", "Poll the job until it completes", StepType::Poll),
            FlowStep::new("fetch_result", "Download the job output", StepType::ApiCall),
        ],
        estimated_duration_ms: Some(120_000),
    }
}

/// Encrypt a file with a secret's key material.
pub async fn encrypt_file(
    ctx: &FlowContext,
    params: &FileJobParams,
    options: &FlowOptions,
) -> FlowResult<FileJobData> {
    run_file_job(ctx, JobType::Encrypt, params, options).await
}

/// Decrypt a previously encrypted file.
pub async fn decrypt_file(
    ctx: &FlowContext,
    params: &FileJobParams,
    options: &FlowOptions,
) -> FlowResult<FileJobData> {
    run_file_job(ctx, JobType::Decrypt, params, options).await
}

async fn run_file_job(
    ctx: &FlowContext,
    job_type: JobType,
    params: &FileJobParams,
    options: &FlowOptions,
) -> FlowResult<FileJobData> {
    let mut run = StepRunner::new(plan(job_type), options, ctx.cancel.clone());
    if options.mode == FlowMode::Plan {
        return run.into_plan_result();
    }

    let outcome = async {
        let submitted = run
            .step(
                "request_job",
                submit_job_guarded(
                    ctx,
                    job_type,
                    params.secret_id.clone(),
                    params.data.clone(),
                    params.file_name.clone(),
                ),
            )
            .await?;

        let job = run.step("wait_job", await_terminal(ctx, submitted.id.clone())).await?;

        let output = if job.result_file_name.is_some() {
            let job_id = job.id.clone();
            Some(
                run.step("fetch_result", async {
                    ctx.blackbox.fetch_result(&job_id).await
                })
                .await?,
            )
        } else {
            run.skip("fetch_result");
            None
        };

        Ok(FileJobData { job, output })
    }
    .await;

    match outcome {
        Ok(data) => run.finish(data),
        Err(error) => run.fail(error),
    }
}

/// Sign fresh authentication material and submit a job, retrying the whole
/// sign-and-submit only when the service rejects the embedded block as
/// stale. A stale rejection created nothing server-side, so repeating it is
/// safe; the job the service does accept is created exactly once.
pub(crate) async fn submit_job_guarded(
    ctx: &FlowContext,
    job_type: JobType,
    secret_id: String,
    data: Vec<u8>,
    file_name: Option<String>,
) -> SdkResult<JobInfo> {
    let purpose = match job_type {
        JobType::Encrypt => "encrypt",
        JobType::Decrypt => "decrypt",
    };

    with_block_fresh_retry(
        ctx.read_client.clone(),
        ctx.chain_id,
        &ctx.freshness,
        None,
        &ctx.cancel,
        |fresh| {
            let secret_id = secret_id.clone();
            let data = data.clone();
            let file_name = file_name.clone();
            async move {
                let auth = build_auth(ctx.signer.as_ref(), &fresh, purpose).await?;
                let request = JobRequest {
                    job_type,
                    secret_id,
                    chain_id: ctx.chain_id,
                    auth,
                    data,
                    file_name,
                };
                let job = ctx.blackbox.submit_job(&request).await?;
                tracing::info!(job_id = %job.id, kind = ?job_type, "job accepted");
                Ok(job)
            }
        },
    )
    .await
}

/// Poll a job to its terminal state and convert remote failure and expiry
/// into errors; a completed job passes through with its fields intact.
pub(crate) async fn await_terminal(ctx: &FlowContext, job_id: String) -> SdkResult<JobInfo> {
    let progress = |job: &JobInfo| {
        tracing::debug!(
            job_id = %job.id,
            status = ?job.status,
            progress = job.progress,
            "job progress"
        );
    };
    let callback: &(dyn Fn(&JobInfo) + Send + Sync) = &progress;

    let job = poll_until_complete(
        ctx.blackbox.as_ref(),
        &job_id,
        &ctx.polling,
        Some(callback),
        &ctx.cancel,
    )
    .await?;

    match job.status {
        JobStatus::Completed => Ok(job),
        JobStatus::Failed => Err(SdkError::JobFailed {
            job_id: job.id.clone(),
            message: job
                .error
                .clone()
                .unwrap_or_else(|| "no error reported".to_string()),
        }),
        JobStatus::Expired => Err(SdkError::JobExpired {
            job_id: job.id.clone(),
        }),
        JobStatus::Pending | JobStatus::Processing => Err(SdkError::Api(format!(
            "poller returned non-terminal status {:?}",
            job.status
        ))),
    }
}
