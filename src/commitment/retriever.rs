//! Locate and decode commitment event logs.

use alloy::primitives::{Address, B256};

use crate::abi;
use crate::adapters::{LogEntry, LogFilter, ReadClient};
use crate::commitment::types::CommitmentData;
use crate::error::{SdkError, SdkResult};

/// Block range the widened lookup covers around `stored_at_block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRange {
    pub blocks_before: u64,
    pub blocks_after: u64,
}

impl Default for SearchRange {
    fn default() -> Self {
        Self {
            blocks_before: 0,
            blocks_after: 5,
        }
    }
}

/// Fetch the commitment payload recorded at exactly `stored_at_block`.
///
/// Queries `DataStored` first, then falls back to `DataUpdated` at the same
/// block; when several logs match, the highest log index (the most recent
/// write within the block) wins.
pub async fn fetch_commitment_from_logs(
    read_client: &dyn ReadClient,
    chain_id: u64,
    contract: Address,
    data_id: B256,
    stored_at_block: u64,
) -> SdkResult<CommitmentData> {
    let stored_filter = LogFilter::event_at_block(contract, abi::data_stored_topic(), stored_at_block)
        .with_topic(1, data_id);
    let mut logs = read_client.get_logs(chain_id, &stored_filter).await?;

    if logs.is_empty() {
        let updated_filter =
            LogFilter::event_at_block(contract, abi::data_updated_topic(), stored_at_block)
                .with_topic(1, data_id);
        logs = read_client.get_logs(chain_id, &updated_filter).await?;
    }

    let best = logs
        .into_iter()
        .max_by_key(|log| log.log_index)
        .ok_or_else(|| SdkError::CommitmentNotFound {
            data_id: data_id.to_string(),
        })?;

    tracing::debug!(
        data_id = %data_id,
        block = best.block_number,
        log_index = best.log_index,
        "commitment log located"
    );
    abi::decode_commitment_log(&best)
}

/// Widened lookup across `stored_at_block ± range`, merging both event
/// kinds.
///
/// Selection order: an exact-block match beats any other block; among
/// exact-block matches the highest log index wins; otherwise the log whose
/// block is numerically closest to `stored_at_block` is taken.
pub async fn fetch_commitment_widened(
    read_client: &dyn ReadClient,
    chain_id: u64,
    contract: Address,
    data_id: B256,
    stored_at_block: u64,
    range: &SearchRange,
) -> SdkResult<CommitmentData> {
    let from_block = stored_at_block.saturating_sub(range.blocks_before);
    let to_block = stored_at_block.saturating_add(range.blocks_after);

    let stored_filter = LogFilter::event_at_block(contract, abi::data_stored_topic(), stored_at_block)
        .with_topic(1, data_id)
        .spanning(from_block, to_block);
    let updated_filter =
        LogFilter::event_at_block(contract, abi::data_updated_topic(), stored_at_block)
            .with_topic(1, data_id)
            .spanning(from_block, to_block);

    let mut logs = read_client.get_logs(chain_id, &stored_filter).await?;
    logs.extend(read_client.get_logs(chain_id, &updated_filter).await?);

    let best = select_candidate(logs, stored_at_block).ok_or_else(|| {
        SdkError::CommitmentNotFound {
            data_id: data_id.to_string(),
        }
    })?;

    if best.block_number != stored_at_block {
        tracing::warn!(
            data_id = %data_id,
            expected_block = stored_at_block,
            found_block = best.block_number,
            "commitment log found outside its recorded block"
        );
    }
    abi::decode_commitment_log(&best)
}

fn select_candidate(logs: Vec<LogEntry>, target_block: u64) -> Option<LogEntry> {
    let exact_best = logs
        .iter()
        .filter(|log| log.block_number == target_block)
        .max_by_key(|log| log.log_index)
        .cloned();
    if exact_best.is_some() {
        return exact_best;
    }

    logs.into_iter().min_by_key(|log| {
        (
            log.block_number.abs_diff(target_block),
            std::cmp::Reverse(log.log_index),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CallRequest;
    use alloy::primitives::Bytes;
    use alloy::sol_types::SolValue;
    use async_trait::async_trait;

    fn entry(block: u64, index: u64) -> LogEntry {
        LogEntry {
            address: Address::ZERO,
            topics: vec![abi::data_stored_topic()],
            data: Bytes::new(),
            block_number: block,
            log_index: index,
            transaction_hash: None,
        }
    }

    #[test]
    fn test_exact_block_beats_closer_index() {
        let picked =
            select_candidate(vec![entry(99, 50), entry(100, 1), entry(101, 2)], 100).unwrap();
        assert_eq!(picked.block_number, 100);
    }

    #[test]
    fn test_highest_index_wins_within_block() {
        let picked = select_candidate(vec![entry(100, 1), entry(100, 7)], 100).unwrap();
        assert_eq!(picked.log_index, 7);
    }

    #[test]
    fn test_closest_block_when_no_exact_match() {
        let picked = select_candidate(vec![entry(97, 0), entry(102, 0)], 100).unwrap();
        assert_eq!(picked.block_number, 102);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(select_candidate(vec![], 100).is_none());
    }

    /// Serves a fixed log set, filtered by block range and positional
    /// topics the way a node would.
    struct LogStore {
        logs: Vec<LogEntry>,
    }

    #[async_trait]
    impl ReadClient for LogStore {
        async fn get_block_number(&self, _chain_id: u64) -> SdkResult<u64> {
            unimplemented!("not used by the retriever")
        }

        async fn get_logs(&self, _chain_id: u64, filter: &LogFilter) -> SdkResult<Vec<LogEntry>> {
            Ok(self
                .logs
                .iter()
                .filter(|log| {
                    log.block_number >= filter.from_block
                        && log.block_number <= filter.to_block
                        && filter.topics.iter().enumerate().all(|(i, topic)| {
                            topic.is_none() || log.topics.get(i) == topic.as_ref()
                        })
                })
                .cloned()
                .collect())
        }

        async fn call(&self, _chain_id: u64, _request: &CallRequest) -> SdkResult<Bytes> {
            unimplemented!("not used by the retriever")
        }
    }

    fn payload_log(
        topic0: B256,
        data_id: B256,
        message: &[u8],
        block: u64,
        index: u64,
    ) -> LogEntry {
        LogEntry {
            address: Address::ZERO,
            topics: vec![topic0, data_id],
            data: Bytes::from(
                (Bytes::from(b"envelope".to_vec()), Bytes::copy_from_slice(message))
                    .abi_encode_params(),
            ),
            block_number: block,
            log_index: index,
            transaction_hash: None,
        }
    }

    #[tokio::test]
    async fn test_updated_log_returned_when_no_stored_log_exists() {
        let data_id = B256::repeat_byte(5);
        let store = LogStore {
            logs: vec![
                payload_log(abi::data_updated_topic(), data_id, b"older write", 100, 1),
                payload_log(abi::data_updated_topic(), data_id, b"latest write", 100, 7),
            ],
        };

        let commitment =
            fetch_commitment_from_logs(&store, 1, Address::ZERO, data_id, 100)
                .await
                .unwrap();
        // Fell back to the updated event and took the highest index.
        assert_eq!(commitment.encrypted_message.as_ref(), b"latest write");
    }

    #[tokio::test]
    async fn test_highest_index_wins_among_stored_logs_at_block() {
        let data_id = B256::repeat_byte(5);
        let store = LogStore {
            logs: vec![
                payload_log(abi::data_stored_topic(), data_id, b"first", 100, 0),
                payload_log(abi::data_stored_topic(), data_id, b"second", 100, 3),
            ],
        };

        let commitment =
            fetch_commitment_from_logs(&store, 1, Address::ZERO, data_id, 100)
                .await
                .unwrap();
        assert_eq!(commitment.encrypted_message.as_ref(), b"second");
    }

    #[tokio::test]
    async fn test_no_log_at_block_is_not_found() {
        let data_id = B256::repeat_byte(5);
        let store = LogStore {
            // A matching log exists, but outside the queried block.
            logs: vec![payload_log(abi::data_stored_topic(), data_id, b"x", 99, 0)],
        };

        let err = fetch_commitment_from_logs(&store, 1, Address::ZERO, data_id, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::CommitmentNotFound { .. }));
    }
}
