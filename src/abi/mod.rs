//! ABI tables for the secret-management contract.
//!
//! # Responsibilities
//! - Pure `encode(args) -> bytes` / `decode(bytes) -> struct` functions
//! - No I/O, no retries; every network decision lives in the callers
//!
//! Declared with alloy's `sol!` macro so the byte packing stays generated
//! rather than hand-rolled.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

use crate::adapters::LogEntry;
use crate::commitment::types::{CiferMetadata, CommitmentData};
use crate::error::{SdkError, SdkResult};

sol! {
    /// Emitted on the first write of a commitment.
    #[derive(Debug)]
    event DataStored(bytes32 indexed dataId, bytes cifer, bytes encryptedMessage);

    /// Emitted when an existing commitment is overwritten.
    #[derive(Debug)]
    event DataUpdated(bytes32 indexed dataId, bytes cifer, bytes encryptedMessage);

    /// Emitted when a secret record is created.
    #[derive(Debug)]
    event SecretCreated(uint256 indexed secretId, address indexed owner);

    function creationFee() external view returns (uint256);
    function createSecret(address delegate) external payable returns (uint256);
    function storeCommitment(uint256 secretId, bytes cifer, bytes encryptedMessage) external;
    function commitmentMetadata(bytes32 dataId) external view returns (
        uint256 secretId,
        uint64 storedAtBlock,
        bytes32 ciferHash,
        bytes32 encryptedMessageHash
    );
    function isSyncing(uint256 secretId) external view returns (bool);
}

/// Topic0 of the `DataStored` event.
pub fn data_stored_topic() -> B256 {
    DataStored::SIGNATURE_HASH
}

/// Topic0 of the `DataUpdated` event.
pub fn data_updated_topic() -> B256 {
    DataUpdated::SIGNATURE_HASH
}

/// Topic0 of the `SecretCreated` event.
pub fn secret_created_topic() -> B256 {
    SecretCreated::SIGNATURE_HASH
}

/// Calldata for the secret-creation fee query.
pub fn encode_creation_fee() -> Bytes {
    creationFeeCall {}.abi_encode().into()
}

/// Decode the fee query's return data.
pub fn decode_creation_fee(data: &[u8]) -> SdkResult<U256> {
    creationFeeCall::abi_decode_returns(data)
        .map_err(|e| SdkError::Abi(format!("creationFee return: {}", e)))
}

/// Calldata for `createSecret(delegate)`.
pub fn encode_create_secret(delegate: Address) -> Bytes {
    createSecretCall { delegate }.abi_encode().into()
}

/// Calldata for `storeCommitment(secretId, cifer, encryptedMessage)`.
pub fn encode_store_commitment(
    secret_id: U256,
    cifer: &[u8],
    encrypted_message: &[u8],
) -> Bytes {
    storeCommitmentCall {
        secretId: secret_id,
        cifer: Bytes::copy_from_slice(cifer),
        encryptedMessage: Bytes::copy_from_slice(encrypted_message),
    }
    .abi_encode()
    .into()
}

/// Calldata for the commitment metadata query.
pub fn encode_commitment_metadata(data_id: B256) -> Bytes {
    commitmentMetadataCall { dataId: data_id }.abi_encode().into()
}

/// Decode the metadata query's return data into [`CiferMetadata`].
pub fn decode_commitment_metadata(data: &[u8]) -> SdkResult<CiferMetadata> {
    let ret = commitmentMetadataCall::abi_decode_returns(data)
        .map_err(|e| SdkError::Abi(format!("commitmentMetadata return: {}", e)))?;
    Ok(CiferMetadata {
        secret_id: ret.secretId,
        stored_at_block: ret.storedAtBlock,
        cifer_hash: ret.ciferHash,
        encrypted_message_hash: ret.encryptedMessageHash,
    })
}

/// Calldata for the per-secret sync-state query.
pub fn encode_is_syncing(secret_id: U256) -> Bytes {
    isSyncingCall { secretId: secret_id }.abi_encode().into()
}

/// Decode the sync-state query's return data.
pub fn decode_is_syncing(data: &[u8]) -> SdkResult<bool> {
    isSyncingCall::abi_decode_returns(data)
        .map_err(|e| SdkError::Abi(format!("isSyncing return: {}", e)))
}

/// Pull the created secret id out of a receipt's logs, if present.
pub fn extract_secret_id(logs: &[LogEntry]) -> Option<U256> {
    logs.iter().find_map(|log| {
        if log.topics.first() == Some(&SecretCreated::SIGNATURE_HASH) {
            log.topics.get(1).map(|t| U256::from_be_bytes(t.0))
        } else {
            None
        }
    })
}

/// Pull the data id out of a receipt's `DataStored`/`DataUpdated` logs.
pub fn extract_data_id(logs: &[LogEntry]) -> Option<B256> {
    logs.iter().find_map(|log| {
        let topic0 = log.topics.first()?;
        if *topic0 == DataStored::SIGNATURE_HASH || *topic0 == DataUpdated::SIGNATURE_HASH {
            log.topics.get(1).copied()
        } else {
            None
        }
    })
}

/// Decode a stored/updated commitment log's payload.
pub fn decode_commitment_log(log: &LogEntry) -> SdkResult<CommitmentData> {
    let topic0 = log
        .topics
        .first()
        .ok_or_else(|| SdkError::Abi("commitment log has no topics".to_string()))?;

    let (cifer, encrypted_message) = if *topic0 == DataStored::SIGNATURE_HASH {
        let ev = DataStored::decode_raw_log(log.topics.iter().copied(), &log.data)
            .map_err(|e| SdkError::Abi(format!("DataStored payload: {}", e)))?;
        (ev.cifer, ev.encryptedMessage)
    } else if *topic0 == DataUpdated::SIGNATURE_HASH {
        let ev = DataUpdated::decode_raw_log(log.topics.iter().copied(), &log.data)
            .map_err(|e| SdkError::Abi(format!("DataUpdated payload: {}", e)))?;
        (ev.cifer, ev.encryptedMessage)
    } else {
        return Err(SdkError::Abi(format!(
            "log topic {} is not a commitment event",
            topic0
        )));
    };

    Ok(CommitmentData::from_parts(cifer, encrypted_message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolValue;

    fn stored_log(data_id: B256, cifer: &[u8], message: &[u8], block: u64, index: u64) -> LogEntry {
        LogEntry {
            address: Address::ZERO,
            topics: vec![DataStored::SIGNATURE_HASH, data_id],
            data: Bytes::from(
                (
                    Bytes::copy_from_slice(cifer),
                    Bytes::copy_from_slice(message),
                )
                    .abi_encode_params(),
            ),
            block_number: block,
            log_index: index,
            transaction_hash: None,
        }
    }

    #[test]
    fn test_commitment_log_roundtrip() {
        let data_id = B256::repeat_byte(7);
        let log = stored_log(data_id, b"envelope", b"payload", 100, 0);
        let decoded = decode_commitment_log(&log).unwrap();
        assert_eq!(decoded.cifer.as_ref(), b"envelope");
        assert_eq!(decoded.encrypted_message.as_ref(), b"payload");
    }

    #[test]
    fn test_extract_secret_id() {
        let secret_id = U256::from(42u64);
        let log = LogEntry {
            address: Address::ZERO,
            topics: vec![
                SecretCreated::SIGNATURE_HASH,
                B256::from(secret_id.to_be_bytes::<32>()),
                B256::ZERO,
            ],
            data: Bytes::new(),
            block_number: 1,
            log_index: 0,
            transaction_hash: None,
        };
        assert_eq!(extract_secret_id(&[log]), Some(secret_id));
        assert_eq!(extract_secret_id(&[]), None);
    }

    #[test]
    fn test_unknown_topic_rejected() {
        let log = LogEntry {
            address: Address::ZERO,
            topics: vec![B256::repeat_byte(9)],
            data: Bytes::new(),
            block_number: 1,
            log_index: 0,
            transaction_hash: None,
        };
        assert!(decode_commitment_log(&log).is_err());
    }
}
