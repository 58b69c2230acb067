//! Content-hash verification and pre-storage size checks.

use alloy::primitives::keccak256;
use serde::Serialize;

use crate::commitment::types::{CiferMetadata, CommitmentData};
use crate::error::{SdkError, SdkResult};

/// Fixed size of a cifer envelope. Writes with any other envelope size are
/// rejected before a transaction is built.
pub const CIFER_ENVELOPE_BYTES: usize = 256;

/// Maximum accepted encrypted-message payload.
pub const MAX_ENCRYPTED_MESSAGE_BYTES: usize = 8192;

/// Outcome of a non-throwing integrity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub cifer_matches: bool,
    pub encrypted_message_matches: bool,
}

impl IntegrityReport {
    pub fn is_valid(&self) -> bool {
        self.cifer_matches && self.encrypted_message_matches
    }
}

/// Recompute the content hashes of retrieved bytes and compare each against
/// the fingerprint recorded in contract storage. Never errors; callers that
/// want a hard failure use [`assert_commitment_integrity`].
pub fn verify_commitment_integrity(
    data: &CommitmentData,
    metadata: &CiferMetadata,
) -> IntegrityReport {
    IntegrityReport {
        cifer_matches: keccak256(&data.cifer) == metadata.cifer_hash,
        encrypted_message_matches: keccak256(&data.encrypted_message)
            == metadata.encrypted_message_hash,
    }
}

/// Throwing wrapper: the only check that bytes recovered from logs are the
/// bytes the contract fingerprinted.
pub fn assert_commitment_integrity(
    data: &CommitmentData,
    metadata: &CiferMetadata,
) -> SdkResult<()> {
    let report = verify_commitment_integrity(data, metadata);
    if report.is_valid() {
        return Ok(());
    }

    let mut mismatches = Vec::new();
    if !report.cifer_matches {
        mismatches.push("cifer");
    }
    if !report.encrypted_message_matches {
        mismatches.push("encrypted message");
    }
    Err(SdkError::Integrity(format!(
        "{} hash does not match the on-chain fingerprint (possible tampering or corruption)",
        mismatches.join(" and ")
    )))
}

/// Inverse pre-check used before committing new data: enforce the fixed
/// envelope size and the payload cap so oversized writes fail before any
/// transaction is built.
pub fn validate_for_storage(cifer: &[u8], encrypted_message: &[u8]) -> SdkResult<()> {
    if cifer.len() != CIFER_ENVELOPE_BYTES {
        return Err(SdkError::Commitment(format!(
            "cifer envelope must be exactly {} bytes, got {}",
            CIFER_ENVELOPE_BYTES,
            cifer.len()
        )));
    }
    if encrypted_message.len() > MAX_ENCRYPTED_MESSAGE_BYTES {
        return Err(SdkError::Commitment(format!(
            "encrypted message is {} bytes, limit is {}",
            encrypted_message.len(),
            MAX_ENCRYPTED_MESSAGE_BYTES
        )));
    }
    Ok(())
}
