//! Flow plan and step data model.

use serde::Serialize;
use std::sync::Arc;

use crate::adapters::{TxIntent, TxReceiptInfo};
use crate::error::SdkError;

/// What kind of work a step performs. Closed tag set; match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Transaction,
    ApiCall,
    Poll,
    Read,
    Compute,
}

/// Step lifecycle. Transitions only move forward
/// (`Pending → InProgress → Completed | Failed`, optionally `Skipped`);
/// at most one step per flow is `InProgress` at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

/// One unit of work in a flow. In plan mode these are returned untouched;
/// in execute mode the same objects are mutated in place as the flow runs.
#[derive(Debug, Clone, Serialize)]
pub struct FlowStep {
    pub id: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub status: StepStatus,
    /// Filled in at execute time for transaction steps, before submission.
    pub tx_intent: Option<TxIntent>,
    /// Snapshot of the step's output once completed.
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl FlowStep {
    pub fn new(id: &'static str, description: &'static str, step_type: StepType) -> Self {
        Self {
            id,
            description,
            step_type,
            status: StepStatus::Pending,
            tx_intent: None,
            result: None,
            error: None,
        }
    }
}

/// Ordered step list for one flow invocation.
#[derive(Debug, Clone, Serialize)]
pub struct FlowPlan {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: Vec<FlowStep>,
    pub estimated_duration_ms: Option<u64>,
}

/// Plan mode returns the step list with zero side effects; execute mode
/// runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMode {
    Plan,
    #[default]
    Execute,
}

/// Per-invocation options.
#[derive(Clone, Default)]
pub struct FlowOptions {
    pub mode: FlowMode,
    /// Invoked whenever a step changes status.
    pub on_step_progress: Option<Arc<dyn Fn(&FlowStep) + Send + Sync>>,
}

impl FlowOptions {
    pub fn plan() -> Self {
        Self {
            mode: FlowMode::Plan,
            on_step_progress: None,
        }
    }
}

impl std::fmt::Debug for FlowOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowOptions")
            .field("mode", &self.mode)
            .field("has_progress_callback", &self.on_step_progress.is_some())
            .finish()
    }
}

/// Outcome of one flow invocation. On failure the plan shows exactly which
/// step failed; flows never surface an unhandled error outside of this.
#[derive(Debug)]
pub struct FlowResult<T> {
    pub plan: FlowPlan,
    pub data: Option<T>,
    pub error: Option<SdkError>,
    pub receipts: Vec<TxReceiptInfo>,
}

impl<T> FlowResult<T> {
    /// `true` iff no step failed. When `true`, execute-mode results carry
    /// `data`; plan-mode results carry only the plan.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}
