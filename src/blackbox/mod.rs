//! Blackbox service integration.
//!
//! # Data Flow
//! ```text
//! Flow step (submit/wait/fetch)
//!     → client.rs (HTTP API over reqwest)
//!     → poller.rs (poll job status until a terminal state)
//!     → types.rs (JobInfo state machine, polling strategy)
//! ```
//!
//! # Design Decisions
//! - The API surface is a trait so tests script response sequences
//! - Polling budget and backoff are owned by the caller's `PollingStrategy`
//! - The abort token is raced against every sleep, never checked lazily

pub mod client;
pub mod poller;
pub mod types;

pub use client::{BlackboxApi, HttpBlackboxClient, JobRequest};
pub use poller::poll_until_complete;
pub use types::{JobInfo, JobStatus, JobType, PollingStrategy};
