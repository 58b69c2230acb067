//! Block-freshness validation and stale-only retry.
//!
//! # Data Flow
//! ```text
//! Authenticated Blackbox call
//!     → auth.rs (sign "address:chain:block:purpose" with a fresh head)
//!     → guard.rs (validate freshness; retry the call when rejected stale)
//! ```
//!
//! # Design Decisions
//! - Authentication embeds a block number to prevent replay; latency between
//!   reading the head and server-side validation can make a legitimate
//!   request look stale, so that one failure class gets bounded retry
//! - Every retry re-reads the head (never cached) and re-signs
//! - No other error class is ever retried here

pub mod auth;
pub mod guard;

pub use auth::{build_auth, AuthMaterial};
pub use guard::{
    validate_block_freshness, with_block_fresh_retry, FreshBlock, FreshnessPolicy,
    FORWARD_SKEW_TOLERANCE_BLOCKS,
};
