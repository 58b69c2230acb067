//! Per-invocation dependency bag.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::adapters::{ReadClient, SignerAdapter, TxExecutor};
use crate::blackbox::client::BlackboxApi;
use crate::blackbox::types::PollingStrategy;
use crate::cancel::CancelToken;
use crate::error::{SdkError, SdkResult};
use crate::freshness::guard::{FreshBlock, FreshnessPolicy};

/// Everything a flow needs, owned by the caller and never mutated by the
/// engine. Build one per invocation; nothing in here is a process-wide
/// singleton.
#[derive(Clone)]
pub struct FlowContext {
    pub signer: Arc<dyn SignerAdapter>,
    pub read_client: Arc<dyn ReadClient>,
    pub blackbox: Arc<dyn BlackboxApi>,
    /// Required only by flows that submit transactions.
    pub tx_executor: Option<Arc<dyn TxExecutor>>,
    pub chain_id: u64,
    pub contract_address: Address,
    pub polling: PollingStrategy,
    pub freshness: FreshnessPolicy,
    pub cancel: CancelToken,
}

impl FlowContext {
    /// Assemble a context with default polling, freshness, and a fresh
    /// cancel token. Optional collaborators attach through the `with_*`
    /// methods.
    pub fn new(
        signer: Arc<dyn SignerAdapter>,
        read_client: Arc<dyn ReadClient>,
        blackbox: Arc<dyn BlackboxApi>,
        chain_id: u64,
        contract_address: Address,
    ) -> Self {
        Self {
            signer,
            read_client,
            blackbox,
            tx_executor: None,
            chain_id,
            contract_address,
            polling: PollingStrategy::default(),
            freshness: FreshnessPolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_tx_executor(mut self, tx_executor: Arc<dyn TxExecutor>) -> Self {
        self.tx_executor = Some(tx_executor);
        self
    }

    pub fn with_polling(mut self, polling: PollingStrategy) -> Self {
        self.polling = polling;
        self
    }

    pub fn with_freshness(mut self, freshness: FreshnessPolicy) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// On-demand head reader for this context's chain.
    pub fn fresh_block(&self) -> FreshBlock {
        FreshBlock::new(self.read_client.clone(), self.chain_id)
    }

    /// The executor, or a fail-fast configuration error for flows that
    /// cannot run without one.
    pub fn require_tx_executor(&self) -> SdkResult<Arc<dyn TxExecutor>> {
        self.tx_executor.clone().ok_or_else(|| {
            SdkError::Config(
                "this flow submits transactions but the context has no tx_executor".to_string(),
            )
        })
    }
}

impl std::fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowContext")
            .field("chain_id", &self.chain_id)
            .field("contract_address", &self.contract_address)
            .field("has_tx_executor", &self.tx_executor.is_some())
            .field("polling", &self.polling)
            .field("freshness", &self.freshness)
            .finish()
    }
}
