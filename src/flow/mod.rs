//! Multi-step flows.
//!
//! # Data Flow
//! ```text
//! FlowContext (caller-owned collaborators)
//!     → types.rs (plan / step / result model)
//!     → runner.rs (sequential execution, status tracking, progress)
//!     → create_secret.rs  (fee read → creation tx → key sync wait)
//!     → files.rs          (authenticated job submit → poll → result)
//!     → commitments.rs    (encrypt-then-commit, retrieve-then-decrypt)
//! ```
//!
//! # Design Decisions
//! - Plan and execute share one code path: every flow builds its plan
//!   first and returns it untouched in plan mode
//! - Steps run strictly in declaration order; the engine never retries a
//!   side-effecting step
//! - A flow call always returns a `FlowResult`; step failures are recorded
//!   on the failing step, never propagated as bare errors

pub mod commitments;
pub mod create_secret;
pub mod files;
pub(crate) mod runner;
pub mod types;

pub use commitments::{
    encrypt_then_commit, retrieve_then_decrypt, EncryptCommitData, EncryptCommitParams,
    RetrieveDecryptData, RetrieveDecryptParams,
};
pub use create_secret::{create_secret, CreateSecretData, CreateSecretParams};
pub use files::{decrypt_file, encrypt_file, FileJobData, FileJobParams};
pub use types::{FlowMode, FlowOptions, FlowPlan, FlowResult, FlowStep, StepStatus, StepType};
