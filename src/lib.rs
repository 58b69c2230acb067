//! CIFER client SDK: secret management flows, Blackbox job polling,
//! block-freshness authentication, and commitment retrieval with integrity
//! verification.

pub mod abi;
pub mod adapters;
pub mod blackbox;
pub mod cancel;
pub mod commitment;
pub mod context;
pub mod error;
pub mod flow;
pub mod freshness;

pub use cancel::CancelToken;
pub use context::FlowContext;
pub use error::{SdkError, SdkResult};
pub use flow::{FlowMode, FlowOptions, FlowPlan, FlowResult, FlowStep, StepStatus, StepType};
