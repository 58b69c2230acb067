//! SDK-wide error taxonomy.
//!
//! # Responsibilities
//! - One `thiserror` enum covering every failure class the SDK surfaces
//! - Keep timeout, cancellation, and remote-failure distinguishable
//! - Carry the numbers (blocks, attempts) callers need for diagnostics

use thiserror::Error;

/// Errors surfaced by flows and the layers beneath them.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A flow step failed. Wraps the underlying error and names the flow
    /// and the step so callers can correlate with the returned plan.
    #[error("flow '{flow}' failed at step '{step_id}': {source}")]
    Flow {
        flow: &'static str,
        step_id: String,
        #[source]
        source: Box<SdkError>,
    },

    /// The caller triggered the cancel token.
    #[error("operation aborted by caller")]
    Aborted,

    /// A polling loop exhausted its attempt budget.
    #[error("'{subject}' still pending after {attempts} polling attempts")]
    PollTimeout { subject: String, attempts: u32 },

    /// The block embedded in authentication material is too far behind the
    /// chain head. The only error class subject to automatic retry.
    #[error(
        "block {used_block} is stale: head is {current_block}, freshness window is {max_window} blocks"
    )]
    BlockStale {
        used_block: u64,
        current_block: u64,
        max_window: u64,
    },

    /// The block is ahead of the chain head beyond the fixed skew tolerance.
    #[error("block {used_block} is ahead of head {current_block} beyond the skew tolerance")]
    BlockInvalid { used_block: u64, current_block: u64 },

    /// No stored or updated commitment log was found for the data id.
    #[error("no commitment found for data id {data_id}")]
    CommitmentNotFound { data_id: String },

    /// Commitment-layer failure other than not-found or tampering.
    #[error("commitment error: {0}")]
    Commitment(String),

    /// Retrieved bytes do not match the fingerprint recorded on-chain.
    #[error("commitment integrity check failed: {0}")]
    Integrity(String),

    /// Wallet signing failed or produced unusable material.
    #[error("signature error: {0}")]
    Signature(String),

    /// The `FlowContext` is missing a collaborator the flow requires.
    #[error("configuration error: {0}")]
    Config(String),

    /// Read-client / RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Blackbox API transport or protocol failure.
    #[error("Blackbox API error: {0}")]
    Api(String),

    /// A submitted transaction was mined but reverted.
    #[error("transaction {tx_hash} reverted")]
    TxReverted { tx_hash: String },

    /// The remote service reported a job as failed.
    #[error("job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    /// The remote service expired a job before it completed.
    #[error("job {job_id} expired before completing")]
    JobExpired { job_id: String },

    /// ABI encode/decode failure.
    #[error("ABI error: {0}")]
    Abi(String),
}

/// Result alias used throughout the SDK.
pub type SdkResult<T> = Result<T, SdkError>;

impl SdkError {
    /// Strip the flow wrapper, if any, to reach the step-level cause.
    pub fn step_cause(&self) -> &SdkError {
        match self {
            SdkError::Flow { source, .. } => source,
            other => other,
        }
    }
}
