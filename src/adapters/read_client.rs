//! Read-only chain access.

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SdkResult;

/// Log filter with positional-wildcard topic semantics: `topics[i] == None`
/// matches any value in position `i`. `from_block == to_block` expresses an
/// exact-block query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub address: Option<Address>,
    pub topics: Vec<Option<B256>>,
    pub from_block: u64,
    pub to_block: u64,
}

impl LogFilter {
    /// Filter for one event signature from one contract at an exact block.
    pub fn event_at_block(address: Address, topic0: B256, block: u64) -> Self {
        Self {
            address: Some(address),
            topics: vec![Some(topic0)],
            from_block: block,
            to_block: block,
        }
    }

    /// Constrain an indexed topic position. Positions in between are padded
    /// with wildcards.
    pub fn with_topic(mut self, position: usize, value: B256) -> Self {
        while self.topics.len() <= position {
            self.topics.push(None);
        }
        self.topics[position] = Some(value);
        self
    }

    /// Widen the block range around the original query.
    pub fn spanning(mut self, from_block: u64, to_block: u64) -> Self {
        self.from_block = from_block;
        self.to_block = to_block;
        self
    }
}

/// A decoded-enough event log: raw topics and data plus position metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction_hash: Option<B256>,
}

/// An `eth_call`-shaped read request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    /// Pin the call to a block; `None` means latest.
    pub block: Option<u64>,
}

/// Chain read access supplied by the caller.
///
/// Implementations are expected to be stateless and safe for concurrent use
/// by independent flow invocations.
#[async_trait]
pub trait ReadClient: Send + Sync {
    /// Latest block number on the given chain.
    async fn get_block_number(&self, chain_id: u64) -> SdkResult<u64>;

    /// Logs matching the filter, ordered by (block_number, log_index).
    async fn get_logs(&self, chain_id: u64, filter: &LogFilter) -> SdkResult<Vec<LogEntry>>;

    /// Execute a read-only contract call and return the raw return data.
    async fn call(&self, chain_id: u64, request: &CallRequest) -> SdkResult<Bytes>;
}
