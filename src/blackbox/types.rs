//! Blackbox job wire types and polling strategy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Encrypt,
    Decrypt,
}

/// Remote job lifecycle state. `Pending` and `Processing` are non-terminal;
/// the rest are terminal: the service never transitions a job out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Expired,
}

impl JobStatus {
    /// Whether the state is final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Expired)
    }
}

/// Job record as reported by the service's status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub status: JobStatus,
    /// 0..=100.
    pub progress: u8,
    pub secret_id: String,
    pub chain_id: u64,
    /// Unix millis.
    pub created_at: u64,
    #[serde(default)]
    pub completed_at: Option<u64>,
    #[serde(default)]
    pub expired_at: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result_file_name: Option<String>,
    /// Seconds the result stays retrievable after completion.
    pub ttl: u64,
    #[serde(default)]
    pub original_size: Option<u64>,
}

/// `{success, job}` envelope the status endpoint wraps responses in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    pub success: bool,
    pub job: JobInfo,
}

/// How a polling loop paces itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PollingStrategy {
    pub interval_ms: u64,
    pub max_attempts: u32,
    /// 1.0 keeps a fixed interval; >1.0 grows it per attempt.
    pub backoff_multiplier: f64,
    /// Cap applied after backoff growth.
    pub max_interval_ms: Option<u64>,
}

impl Default for PollingStrategy {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            max_attempts: 60,
            backoff_multiplier: 1.0,
            max_interval_ms: None,
        }
    }
}

impl PollingStrategy {
    /// Sleep duration before fetch number `attempt + 2` (zero-based attempt
    /// index of the wait that already happened `attempt` times).
    pub fn interval_for(&self, attempt: u32) -> Duration {
        let scaled = self.interval_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let mut millis = scaled as u64;
        if let Some(cap) = self.max_interval_ms {
            millis = millis.min(cap);
        }
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Expired.is_terminal());
    }

    #[test]
    fn test_default_strategy() {
        let strategy = PollingStrategy::default();
        assert_eq!(strategy.interval_ms, 2000);
        assert_eq!(strategy.max_attempts, 60);
        assert_eq!(strategy.interval_for(0), Duration::from_millis(2000));
        assert_eq!(strategy.interval_for(5), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_capped() {
        let strategy = PollingStrategy {
            interval_ms: 100,
            max_attempts: 10,
            backoff_multiplier: 2.0,
            max_interval_ms: Some(350),
        };
        assert_eq!(strategy.interval_for(0), Duration::from_millis(100));
        assert_eq!(strategy.interval_for(1), Duration::from_millis(200));
        assert_eq!(strategy.interval_for(2), Duration::from_millis(350));
        assert_eq!(strategy.interval_for(8), Duration::from_millis(350));
    }

    #[test]
    fn test_job_envelope_decoding() {
        let raw = r#"{
            "success": true,
            "job": {
                "id": "job-1",
                "type": "encrypt",
                "status": "processing",
                "progress": 40,
                "secretId": "7",
                "chainId": 1,
                "createdAt": 1700000000000,
                "ttl": 3600
            }
        }"#;
        let envelope: JobEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.job.job_type, JobType::Encrypt);
        assert_eq!(envelope.job.status, JobStatus::Processing);
        assert_eq!(envelope.job.progress, 40);
        assert!(envelope.job.error.is_none());
    }
}
