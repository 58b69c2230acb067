//! Caller-supplied collaborators.
//!
//! # Data Flow
//! ```text
//! FlowContext (owned by the caller)
//!     → read_client.rs (chain reads: head, logs, eth_call)
//!     → signer.rs (address + message signing for Blackbox auth)
//!     → tx.rs (transaction submission and receipt waiting)
//! ```
//!
//! # Design Decisions
//! - Every collaborator is an object-safe async trait; flows hold `Arc<dyn …>`
//! - The SDK never estimates gas, manages nonces, or resubmits transactions
//! - Adapters are treated as stateless services safe to share across flows

pub mod read_client;
pub mod signer;
pub mod tx;

pub use read_client::{CallRequest, LogEntry, LogFilter, ReadClient};
pub use signer::{LocalSigner, SignerAdapter};
pub use tx::{PendingTx, TxExecutor, TxIntent, TxReceiptInfo};
