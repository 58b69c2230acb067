//! Commitment data model.

use alloy::primitives::{keccak256, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Contract-stored fingerprint of a commitment. Authoritative: the bytes
/// recovered from logs are only trusted after they hash back to this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiferMetadata {
    pub secret_id: U256,
    pub stored_at_block: u64,
    pub cifer_hash: B256,
    pub encrypted_message_hash: B256,
}

/// The encrypted bytes themselves, recoverable only from event logs;
/// contract storage keeps the hashes, never the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentData {
    pub cifer: Bytes,
    pub encrypted_message: Bytes,
    pub cifer_hash: B256,
    pub encrypted_message_hash: B256,
}

impl CommitmentData {
    /// Build from raw parts, computing the content hashes.
    pub fn from_parts(cifer: Bytes, encrypted_message: Bytes) -> Self {
        let cifer_hash = keccak256(&cifer);
        let encrypted_message_hash = keccak256(&encrypted_message);
        Self {
            cifer,
            encrypted_message,
            cifer_hash,
            encrypted_message_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_hashes_content() {
        let data = CommitmentData::from_parts(
            Bytes::from(vec![1u8; 4]),
            Bytes::from(vec![2u8; 8]),
        );
        assert_eq!(data.cifer_hash, keccak256([1u8; 4]));
        assert_eq!(data.encrypted_message_hash, keccak256([2u8; 8]));
    }
}
