//! Commitment flows: encrypt-then-commit and retrieve-then-decrypt.

use alloy::primitives::{Bytes, B256, U256};
use serde::Serialize;

use crate::abi;
use crate::adapters::{CallRequest, TxIntent, TxReceiptInfo};
use crate::blackbox::types::{JobInfo, JobType};
use crate::commitment::integrity::{
    assert_commitment_integrity, validate_for_storage, verify_commitment_integrity,
    CIFER_ENVELOPE_BYTES,
};
use crate::commitment::retriever::{
    fetch_commitment_from_logs, fetch_commitment_widened, SearchRange,
};
use crate::commitment::types::{CiferMetadata, CommitmentData};
use crate::context::FlowContext;
use crate::error::{SdkError, SdkResult};
use crate::flow::files::{await_terminal, submit_job_guarded};
use crate::flow::runner::StepRunner;
use crate::flow::types::{FlowMode, FlowOptions, FlowPlan, FlowResult, FlowStep, StepType};

#[derive(Debug, Clone)]
pub struct EncryptCommitParams {
    pub secret_id: U256,
    pub plaintext: Vec<u8>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EncryptCommitData {
    pub job: JobInfo,
    pub commitment: CommitmentData,
    pub tx_hash: B256,
    /// Data id extracted from the commit receipt's event log.
    pub data_id: Option<B256>,
}

#[derive(Debug, Clone)]
pub struct RetrieveDecryptParams {
    pub data_id: B256,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrieveDecryptData {
    pub metadata: CiferMetadata,
    pub commitment: CommitmentData,
    pub job: JobInfo,
    /// Absent when the job produced no retrievable output file.
    pub plaintext: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
struct CommitTxOutcome {
    receipt: TxReceiptInfo,
    data_id: Option<B256>,
}

fn commit_plan() -> FlowPlan {
    FlowPlan {
        name: "encrypt_then_commit",
        description: "Encrypt data through the Blackbox and commit it on-chain",
        steps: vec![
            FlowStep::new(
                "request_job",
                "Sign authentication material and submit the encrypt job",
                StepType::ApiCall,
            ),
            FlowStep::new("wait_job", "Poll the job until it completes", StepType::Poll),
            FlowStep::new(
                "fetch_payload",
                "Download the encrypted payload",
                StepType::ApiCall,
            ),
            FlowStep::new(
                "validate_payload",
                "Split and size-check the payload before committing",
                StepType::Compute,
            ),
            FlowStep::new(
                "store_commitment_tx",
                "Submit the commitment transaction",
                StepType::Transaction,
            ),
        ],
        estimated_duration_ms: Some(180_000),
    }
}

fn retrieve_plan() -> FlowPlan {
    FlowPlan {
        name: "retrieve_then_decrypt",
        description: "Recover committed bytes from logs, verify them, and decrypt",
        steps: vec![
            FlowStep::new(
                "read_metadata",
                "Read the commitment fingerprint from contract storage",
                StepType::Read,
            ),
            FlowStep::new(
                "fetch_commitment",
                "Locate and decode the commitment event log",
                StepType::Read,
            ),
            FlowStep::new(
                "verify_integrity",
                "Recompute content hashes against the fingerprint",
                StepType::Compute,
            ),
            FlowStep::new(
                "request_job",
                "Sign authentication material and submit the decrypt job",
                StepType::ApiCall,
            ),
            FlowStep::new("wait_job", "Poll the job until it completes", StepType::Poll),
            FlowStep::new("fetch_result", "Download the plaintext", StepType::ApiCall),
        ],
        estimated_duration_ms: Some(150_000),
    }
}

/// Encrypt `plaintext` with a secret's key material and commit the
/// resulting cifer payload on-chain.
pub async fn encrypt_then_commit(
    ctx: &FlowContext,
    params: &EncryptCommitParams,
    options: &FlowOptions,
) -> FlowResult<EncryptCommitData> {
    let mut run = StepRunner::new(commit_plan(), options, ctx.cancel.clone());
    if options.mode == FlowMode::Plan {
        return run.into_plan_result();
    }

    let executor = match ctx.require_tx_executor() {
        Ok(executor) => executor,
        Err(error) => return run.fail(error),
    };

    let outcome = async {
        let submitted = run
            .step(
                "request_job",
                submit_job_guarded(
                    ctx,
                    JobType::Encrypt,
                    params.secret_id.to_string(),
                    params.plaintext.clone(),
                    params.file_name.clone(),
                ),
            )
            .await?;

        let job = run.step("wait_job", await_terminal(ctx, submitted.id.clone())).await?;

        let payload = {
            let job_id = job.id.clone();
            run.step("fetch_payload", async {
                ctx.blackbox.fetch_result(&job_id).await
            })
            .await?
        };

        let commitment = run
            .step("validate_payload", async {
                if payload.len() <= CIFER_ENVELOPE_BYTES {
                    return Err(SdkError::Commitment(format!(
                        "encrypted payload is {} bytes, smaller than the {}-byte envelope",
                        payload.len(),
                        CIFER_ENVELOPE_BYTES
                    )));
                }
                let (cifer, encrypted_message) = payload.split_at(CIFER_ENVELOPE_BYTES);
                validate_for_storage(cifer, encrypted_message)?;
                Ok(CommitmentData::from_parts(
                    Bytes::copy_from_slice(cifer),
                    Bytes::copy_from_slice(encrypted_message),
                ))
            })
            .await?;

        let intent = TxIntent {
            chain_id: ctx.chain_id,
            to: ctx.contract_address,
            data: abi::encode_store_commitment(
                params.secret_id,
                &commitment.cifer,
                &commitment.encrypted_message,
            ),
            value: None,
        };
        run.set_tx_intent("store_commitment_tx", intent.clone());

        let committed = run
            .step("store_commitment_tx", async {
                let pending = executor.send(intent).await?;
                tracing::info!(tx_hash = %pending.hash(), "commitment submitted");
                let receipt = pending.wait_receipt().await?;
                if !receipt.success {
                    return Err(SdkError::TxReverted {
                        tx_hash: receipt.tx_hash.to_string(),
                    });
                }
                let data_id = abi::extract_data_id(&receipt.logs);
                Ok(CommitTxOutcome { receipt, data_id })
            })
            .await?;
        run.push_receipt(committed.receipt.clone());

        Ok(EncryptCommitData {
            job,
            commitment,
            tx_hash: committed.receipt.tx_hash,
            data_id: committed.data_id,
        })
    }
    .await;

    match outcome {
        Ok(data) => run.finish(data),
        Err(error) => run.fail(error),
    }
}

/// Recover a commitment's bytes from event logs, verify them against the
/// on-chain fingerprint, and decrypt them through the Blackbox.
pub async fn retrieve_then_decrypt(
    ctx: &FlowContext,
    params: &RetrieveDecryptParams,
    options: &FlowOptions,
) -> FlowResult<RetrieveDecryptData> {
    let mut run = StepRunner::new(retrieve_plan(), options, ctx.cancel.clone());
    if options.mode == FlowMode::Plan {
        return run.into_plan_result();
    }

    let outcome = async {
        let metadata = run
            .step("read_metadata", async {
                let request = CallRequest {
                    to: ctx.contract_address,
                    data: abi::encode_commitment_metadata(params.data_id),
                    block: None,
                };
                let raw = ctx.read_client.call(ctx.chain_id, &request).await?;
                abi::decode_commitment_metadata(&raw)
            })
            .await?;

        let commitment = run
            .step(
                "fetch_commitment",
                fetch_with_fallback(ctx, params.data_id, metadata.stored_at_block),
            )
            .await?;

        run.step("verify_integrity", async {
            assert_commitment_integrity(&commitment, &metadata)?;
            Ok(verify_commitment_integrity(&commitment, &metadata))
        })
        .await?;

        let mut payload = commitment.cifer.to_vec();
        payload.extend_from_slice(&commitment.encrypted_message);
        let submitted = run
            .step(
                "request_job",
                submit_job_guarded(
                    ctx,
                    JobType::Decrypt,
                    metadata.secret_id.to_string(),
                    payload,
                    None,
                ),
            )
            .await?;

        let job = run.step("wait_job", await_terminal(ctx, submitted.id.clone())).await?;

        let plaintext = if job.result_file_name.is_some() {
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

        Ok(RetrieveDecryptData {
            metadata,
            commitment,
            job,
            plaintext,
        })
    }
    .await;

    match outcome {
        Ok(data) => run.finish(data),
        Err(error) => run.fail(error),
    }
}

/// Exact-block lookup first; when nothing is found there, widen the search
/// around the recorded block before giving up.
async fn fetch_with_fallback(
    ctx: &FlowContext,
    data_id: B256,
    stored_at_block: u64,
) -> SdkResult<CommitmentData> {
    match fetch_commitment_from_logs(
        ctx.read_client.as_ref(),
        ctx.chain_id,
        ctx.contract_address,
        data_id,
        stored_at_block,
    )
    .await
    {
        Ok(commitment) => Ok(commitment),
        Err(SdkError::CommitmentNotFound { .. }) => {
            tracing::warn!(
                data_id = %data_id,
                block = stored_at_block,
                "no log at the recorded block, widening the search"
            );
            fetch_commitment_widened(
                ctx.read_client.as_ref(),
                ctx.chain_id,
                ctx.contract_address,
                data_id,
                stored_at_block,
                &SearchRange::default(),
            )
            .await
        }
        Err(other) => Err(other),
    }
}
