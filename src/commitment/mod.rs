//! Commitment retrieval and integrity verification.
//!
//! # Data Flow
//! ```text
//! CiferMetadata (contract storage: hashes + block)
//!     → retriever.rs (locate the stored/updated event log, decode payload)
//!     → integrity.rs (recompute hashes, compare against the fingerprint)
//! ```
//!
//! # Design Decisions
//! - Contract storage holds only fingerprints; the payload exists solely in
//!   event logs, so log retrieval is the one path to the encrypted bytes
//! - An updated event supersedes a stored one; within a block the highest
//!   log index is the most recent write
//! - Integrity assertion is the only defense against a tampered log source

pub mod integrity;
pub mod retriever;
pub mod types;

pub use integrity::{
    assert_commitment_integrity, validate_for_storage, verify_commitment_integrity,
    IntegrityReport, CIFER_ENVELOPE_BYTES, MAX_ENCRYPTED_MESSAGE_BYTES,
};
pub use retriever::{fetch_commitment_from_logs, fetch_commitment_widened, SearchRange};
pub use types::{CiferMetadata, CommitmentData};
