//! Transaction submission seam.
//!
//! # Responsibilities
//! - Describe a transaction without committing to any wallet library
//! - Hand submission and receipt-waiting to the caller's executor
//!
//! Gas estimation, nonce management, and resubmission are explicitly the
//! executor's problem; a flow issues each intent exactly once.

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapters::read_client::LogEntry;
use crate::error::SdkResult;

/// Library-neutral description of a transaction to broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIntent {
    pub chain_id: u64,
    pub to: Address,
    pub data: Bytes,
    pub value: Option<U256>,
}

/// Receipt details the flows consume after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceiptInfo {
    pub tx_hash: B256,
    pub block_number: u64,
    pub success: bool,
    pub logs: Vec<LogEntry>,
}

/// A submitted transaction awaiting confirmation.
#[async_trait]
pub trait PendingTx: Send + Sync {
    /// Hash assigned at broadcast time.
    fn hash(&self) -> B256;

    /// Suspend until the transaction is confirmed and return its receipt.
    async fn wait_receipt(&self) -> SdkResult<TxReceiptInfo>;
}

/// Caller-supplied transaction executor. Required only by flows that
/// submit transactions; read-only flows run without one.
#[async_trait]
pub trait TxExecutor: Send + Sync {
    /// Broadcast the intent through the caller's wallet integration.
    async fn send(&self, intent: TxIntent) -> SdkResult<Box<dyn PendingTx>>;
}
