//! Signed authentication material for Blackbox requests.

use alloy::primitives::Bytes;
use serde::Serialize;

use crate::adapters::SignerAdapter;
use crate::error::SdkResult;
use crate::freshness::guard::FreshBlock;

/// A signed, replay-bounded authentication payload. The embedded block
/// number is what the server validates for freshness.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMaterial {
    pub message: String,
    pub signature: Bytes,
    pub block_number: u64,
}

/// Read the current head and sign `address:chain_id:block:purpose`.
///
/// Called inside [`with_block_fresh_retry`](crate::freshness::guard::with_block_fresh_retry)
/// so a server-side stale rejection re-reads the head and re-signs.
pub async fn build_auth(
    signer: &dyn SignerAdapter,
    fresh: &FreshBlock,
    purpose: &str,
) -> SdkResult<AuthMaterial> {
    let block_number = fresh.get().await?;
    let message = format!(
        "{}:{}:{}:{}",
        signer.address(),
        fresh.chain_id(),
        block_number,
        purpose
    );
    let signature = signer.sign_message(&message).await?;

    tracing::debug!(block_number, purpose, "authentication material signed");
    Ok(AuthMaterial {
        message,
        signature,
        block_number,
    })
}
