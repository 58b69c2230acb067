//! Sequential step execution over a flow plan.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::adapters::{TxIntent, TxReceiptInfo};
use crate::cancel::CancelToken;
use crate::error::{SdkError, SdkResult};
use crate::flow::types::{FlowOptions, FlowPlan, FlowResult, FlowStep, StepStatus};

/// Drives one plan through execution: status transitions, progress
/// callbacks, result snapshots, and first-failure stop. One runner per
/// invocation; the plan's step objects are mutated in place.
pub(crate) struct StepRunner {
    flow_name: &'static str,
    plan: FlowPlan,
    receipts: Vec<TxReceiptInfo>,
    on_progress: Option<Arc<dyn Fn(&FlowStep) + Send + Sync>>,
    cancel: CancelToken,
}

impl StepRunner {
    pub fn new(plan: FlowPlan, options: &FlowOptions, cancel: CancelToken) -> Self {
        Self {
            flow_name: plan.name,
            plan,
            receipts: Vec::new(),
            on_progress: options.on_step_progress.clone(),
            cancel,
        }
    }

    fn notify(&self, index: usize) {
        if let Some(callback) = &self.on_progress {
            callback(&self.plan.steps[index]);
        }
    }

    fn index_of(&self, id: &str) -> SdkResult<usize> {
        self.plan
            .steps
            .iter()
            .position(|step| step.id == id)
            .ok_or_else(|| SdkError::Config(format!("step '{}' is not in the plan", id)))
    }

    /// Run one step: mark it in progress, await the work, record the
    /// outcome. A failure wraps the cause with the flow and step names and
    /// stops the flow (the caller propagates with `?`).
    pub async fn step<T, Fut>(&mut self, id: &'static str, work: Fut) -> SdkResult<T>
    where
        T: Serialize,
        Fut: Future<Output = SdkResult<T>>,
    {
        let index = self.index_of(id)?;

        if self.cancel.is_cancelled() {
            return Err(self.record_failure(index, SdkError::Aborted));
        }

        self.plan.steps[index].status = StepStatus::InProgress;
        self.notify(index);
        tracing::info!(flow = self.flow_name, step = id, "step started");

        match work.await {
            Ok(value) => {
                let step = &mut self.plan.steps[index];
                step.status = StepStatus::Completed;
                step.result = serde_json::to_value(&value).ok();
                self.notify(index);
                tracing::info!(flow = self.flow_name, step = id, "step completed");
                Ok(value)
            }
            Err(error) => Err(self.record_failure(index, error)),
        }
    }

    fn record_failure(&mut self, index: usize, error: SdkError) -> SdkError {
        let step = &mut self.plan.steps[index];
        step.status = StepStatus::Failed;
        step.error = Some(error.to_string());
        let step_id = step.id.to_string();
        self.notify(index);
        tracing::warn!(
            flow = self.flow_name,
            step = %step_id,
            error = %error,
            "step failed"
        );
        SdkError::Flow {
            flow: self.flow_name,
            step_id,
            source: Box::new(error),
        }
    }

    /// Mark a pending step skipped (e.g. a result download when the job
    /// produced no output file).
    pub fn skip(&mut self, id: &str) {
        if let Ok(index) = self.index_of(id) {
            if self.plan.steps[index].status == StepStatus::Pending {
                self.plan.steps[index].status = StepStatus::Skipped;
                self.notify(index);
            }
        }
    }

    /// Attach the intent to a transaction step before submission so plans
    /// returned on failure show what was about to be sent.
    pub fn set_tx_intent(&mut self, id: &str, intent: TxIntent) {
        if let Ok(index) = self.index_of(id) {
            self.plan.steps[index].tx_intent = Some(intent);
        }
    }

    pub fn push_receipt(&mut self, receipt: TxReceiptInfo) {
        self.receipts.push(receipt);
    }

    /// Plan-mode early return: the untouched plan, no data, no error.
    pub fn into_plan_result<T>(self) -> FlowResult<T> {
        FlowResult {
            plan: self.plan,
            data: None,
            error: None,
            receipts: self.receipts,
        }
    }

    pub fn finish<T>(self, data: T) -> FlowResult<T> {
        FlowResult {
            plan: self.plan,
            data: Some(data),
            error: None,
            receipts: self.receipts,
        }
    }

    pub fn fail<T>(self, error: SdkError) -> FlowResult<T> {
        FlowResult {
            plan: self.plan,
            data: None,
            error: Some(error),
            receipts: self.receipts,
        }
    }
}
