//! Freshness window validation and the stale-retry wrapper.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::adapters::ReadClient;
use crate::cancel::CancelToken;
use crate::error::{SdkError, SdkResult};

/// How far ahead of the observed head a block may sit before it is treated
/// as invalid rather than merely skewed. Policy constant with no derivation
/// from block time; deployments that need a different tolerance change it
/// here.
pub const FORWARD_SKEW_TOLERANCE_BLOCKS: u64 = 5;

/// Freshness window and retry bounds for authenticated calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessPolicy {
    /// Maximum age, in blocks, of the block embedded in auth material.
    pub max_window_blocks: u64,
    /// Retries permitted for stale rejections; other errors never retry.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            max_window_blocks: 100,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Check that `used_block` is acceptable against `current_block`.
///
/// Stale (too old) and invalid (too far in the future) are distinct errors:
/// stale is retryable with a fresh head, a future block points at a broken
/// clock or RPC and is not.
pub fn validate_block_freshness(
    used_block: u64,
    current_block: u64,
    max_window_blocks: u64,
) -> SdkResult<()> {
    if used_block > current_block + FORWARD_SKEW_TOLERANCE_BLOCKS {
        return Err(SdkError::BlockInvalid {
            used_block,
            current_block,
        });
    }
    if current_block.saturating_sub(used_block) > max_window_blocks {
        return Err(SdkError::BlockStale {
            used_block,
            current_block,
            max_window: max_window_blocks,
        });
    }
    Ok(())
}

/// On-demand chain head reader handed to guarded operations. Each `get()`
/// queries the read client so every retry attempt observes a current head.
#[derive(Clone)]
pub struct FreshBlock {
    read_client: Arc<dyn ReadClient>,
    chain_id: u64,
}

impl FreshBlock {
    pub fn new(read_client: Arc<dyn ReadClient>, chain_id: u64) -> Self {
        Self {
            read_client,
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Current head. Never cached.
    pub async fn get(&self) -> SdkResult<u64> {
        self.read_client.get_block_number(self.chain_id).await
    }
}

/// Run `operation` with a fresh-head reader, retrying only on
/// [`SdkError::BlockStale`].
///
/// Between attempts the guard sleeps `retry_delay_ms` (raced against the
/// cancel token) and invokes `on_retry(attempt, error)`. The wrapped
/// operation must be idempotent: the guard is only used around pure reads
/// and Blackbox calls whose stale rejection had no server-side effect.
pub async fn with_block_fresh_retry<T, F, Fut>(
    read_client: Arc<dyn ReadClient>,
    chain_id: u64,
    policy: &FreshnessPolicy,
    on_retry: Option<&(dyn Fn(u32, &SdkError) + Send + Sync)>,
    cancel: &CancelToken,
    operation: F,
) -> SdkResult<T>
where
    F: Fn(FreshBlock) -> Fut,
    Fut: Future<Output = SdkResult<T>>,
{
    let mut attempt: u32 = 0;

    loop {
        let fresh = FreshBlock::new(read_client.clone(), chain_id);
        match operation(fresh).await {
            Ok(value) => return Ok(value),
            Err(error @ SdkError::BlockStale { .. }) => {
                if attempt >= policy.max_retries {
                    return Err(error);
                }
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    error = %error,
                    "stale block rejected, retrying with a fresh head"
                );

                tokio::select! {
                    _ = cancel.cancelled() => return Err(SdkError::Aborted),
                    _ = sleep(Duration::from_millis(policy.retry_delay_ms)) => {}
                }
                if let Some(callback) = on_retry {
                    callback(attempt, &error);
                }
            }
            Err(other) => return Err(other),
        }
    }
}
