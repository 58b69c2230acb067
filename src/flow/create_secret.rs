//! Secret-creation flow: read the fee, submit the creation transaction,
//! wait for the new key pair to finish syncing.

use alloy::primitives::{Address, B256, U256};
use serde::Serialize;
use tokio::time::sleep;

use crate::abi;
use crate::adapters::{CallRequest, TxIntent, TxReceiptInfo};
use crate::context::FlowContext;
use crate::error::{SdkError, SdkResult};
use crate::flow::runner::StepRunner;
use crate::flow::types::{FlowMode, FlowOptions, FlowPlan, FlowResult, FlowStep, StepType};

#[derive(Debug, Clone, Default)]
pub struct CreateSecretParams {
    /// Optional delegate allowed to use the secret besides the owner.
    pub delegate: Option<Address>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSecretData {
    pub secret_id: U256,
    pub tx_hash: B256,
    /// Whether the Blackbox was still generating the key pair when the
    /// flow finished waiting.
    pub syncing: bool,
}

#[derive(Debug, Clone, Serialize)]
struct CreationTxOutcome {
    secret_id: U256,
    receipt: TxReceiptInfo,
}

fn plan() -> FlowPlan {
    FlowPlan {
        name: "create_secret",
        description: "Create an on-chain secret record and wait for its key pair",
        steps: vec![
            FlowStep::new("read_fee", "Read the secret creation fee", StepType::Read),
            FlowStep::new(
                "create_secret_tx",
                "Submit the secret creation transaction",
                StepType::Transaction,
            ),
            FlowStep::new(
                "wait_sync",
                "Wait for the key pair to finish syncing",
                StepType::Poll,
            ),
        ],
        estimated_duration_ms: Some(45_000),
    }
}

/// Create a secret. Plan mode returns the 3-step plan with zero network or
/// signing calls.
pub async fn create_secret(
    ctx: &FlowContext,
    params: &CreateSecretParams,
    options: &FlowOptions,
) -> FlowResult<CreateSecretData> {
    let mut run = StepRunner::new(plan(), options, ctx.cancel.clone());
    if options.mode == FlowMode::Plan {
        return run.into_plan_result();
    }

    // Fail fast before any step runs: this flow submits a transaction.
    let executor = match ctx.require_tx_executor() {
        Ok(executor) => executor,
        Err(error) => return run.fail(error),
    };

    let outcome = async {
        let fee = run
            .step("read_fee", async {
                let request = CallRequest {
                    to: ctx.contract_address,
                    data: abi::encode_creation_fee(),
                    block: None,
                };
                let raw = ctx.read_client.call(ctx.chain_id, &request).await?;
                abi::decode_creation_fee(&raw)
            })
            .await?;

        let intent = TxIntent {
            chain_id: ctx.chain_id,
            to: ctx.contract_address,
            data: abi::encode_create_secret(params.delegate.unwrap_or(Address::ZERO)),
            value: Some(fee),
        };
        run.set_tx_intent("create_secret_tx", intent.clone());

        let creation = run
            .step("create_secret_tx", async {
                let pending = executor.send(intent).await?;
                tracing::info!(tx_hash = %pending.hash(), "secret creation submitted");
                let receipt = pending.wait_receipt().await?;
                if !receipt.success {
                    return Err(SdkError::TxReverted {
                        tx_hash: receipt.tx_hash.to_string(),
                    });
                }
                let secret_id = abi::extract_secret_id(&receipt.logs).ok_or_else(|| {
                    SdkError::Abi("receipt carries no SecretCreated log".to_string())
                })?;
                Ok(CreationTxOutcome { secret_id, receipt })
            })
            .await?;
        run.push_receipt(creation.receipt.clone());

        let syncing = run
            .step("wait_sync", wait_sync(ctx, creation.secret_id))
            .await?;

        Ok(CreateSecretData {
            secret_id: creation.secret_id,
            tx_hash: creation.receipt.tx_hash,
            syncing,
        })
    }
    .await;

    match outcome {
        Ok(data) => run.finish(data),
        Err(error) => run.fail(error),
    }
}

/// Poll the contract's sync-state query until the key pair is published.
/// Returns the final syncing state (`false` on success).
async fn wait_sync(ctx: &FlowContext, secret_id: U256) -> SdkResult<bool> {
    let mut attempts: u32 = 0;
    loop {
        let request = CallRequest {
            to: ctx.contract_address,
            data: abi::encode_is_syncing(secret_id),
            block: None,
        };
        let raw = ctx.read_client.call(ctx.chain_id, &request).await?;
        if !abi::decode_is_syncing(&raw)? {
            return Ok(false);
        }

        attempts += 1;
        if attempts >= ctx.polling.max_attempts {
            return Err(SdkError::PollTimeout {
                subject: format!("secret {} key sync", secret_id),
                attempts,
            });
        }
        tracing::debug!(secret_id = %secret_id, attempt = attempts, "key pair still syncing");

        tokio::select! {
            _ = ctx.cancel.cancelled() => return Err(SdkError::Aborted),
            _ = sleep(ctx.polling.interval_for(attempts - 1)) => {}
        }
    }
}
