//! Scripted mock collaborators shared by the integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use cifer_sdk::adapters::{
    CallRequest, LogEntry, LogFilter, PendingTx, ReadClient, SignerAdapter, TxExecutor, TxIntent,
    TxReceiptInfo,
};
use cifer_sdk::blackbox::client::{BlackboxApi, JobRequest};
use cifer_sdk::blackbox::types::{JobInfo, JobStatus, JobType};
use cifer_sdk::error::{SdkError, SdkResult};

/// Install a log subscriber for the test binary. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cifer_sdk=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Read client replaying scripted call responses in order and serving logs
/// filtered the way a node would.
#[derive(Default)]
pub struct MockReadClient {
    pub head: u64,
    pub call_responses: Mutex<VecDeque<Bytes>>,
    pub logs: Vec<LogEntry>,
    pub calls: Mutex<Vec<CallRequest>>,
    pub head_reads: AtomicU32,
    pub log_queries: AtomicU32,
}

impl MockReadClient {
    pub fn with_head(head: u64) -> Self {
        Self {
            head,
            ..Default::default()
        }
    }

    pub fn push_call_response(&self, data: Bytes) {
        self.call_responses.lock().unwrap().push_back(data);
    }

    pub fn network_calls(&self) -> u32 {
        self.head_reads.load(Ordering::SeqCst)
            + self.log_queries.load(Ordering::SeqCst)
            + self.calls.lock().unwrap().len() as u32
    }
}

#[async_trait]
impl ReadClient for MockReadClient {
    async fn get_block_number(&self, _chain_id: u64) -> SdkResult<u64> {
        self.head_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.head)
    }

    async fn get_logs(&self, _chain_id: u64, filter: &LogFilter) -> SdkResult<Vec<LogEntry>> {
        self.log_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .logs
            .iter()
            .filter(|log| {
                log.block_number >= filter.from_block
                    && log.block_number <= filter.to_block
                    && filter
                        .topics
                        .iter()
                        .enumerate()
                        .all(|(i, topic)| topic.is_none() || log.topics.get(i) == topic.as_ref())
            })
            .cloned()
            .collect())
    }

    async fn call(&self, _chain_id: u64, request: &CallRequest) -> SdkResult<Bytes> {
        self.calls.lock().unwrap().push(request.clone());
        self.call_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SdkError::Rpc("mock has no scripted response left".to_string()))
    }
}

/// Signer returning a fixed dummy signature and counting invocations.
pub struct MockSigner {
    pub address: Address,
    pub sign_calls: AtomicU32,
}

impl Default for MockSigner {
    fn default() -> Self {
        Self {
            address: Address::repeat_byte(0xaa),
            sign_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl SignerAdapter for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_message(&self, _message: &str) -> SdkResult<Bytes> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from(vec![0x11u8; 65]))
    }
}

pub struct MockPendingTx {
    pub receipt: TxReceiptInfo,
}

#[async_trait]
impl PendingTx for MockPendingTx {
    fn hash(&self) -> B256 {
        self.receipt.tx_hash
    }

    async fn wait_receipt(&self) -> SdkResult<TxReceiptInfo> {
        Ok(self.receipt.clone())
    }
}

/// Executor recording intents and replaying scripted receipts.
#[derive(Default)]
pub struct MockTxExecutor {
    pub receipts: Mutex<VecDeque<TxReceiptInfo>>,
    pub sent: Mutex<Vec<TxIntent>>,
}

impl MockTxExecutor {
    pub fn push_receipt(&self, receipt: TxReceiptInfo) {
        self.receipts.lock().unwrap().push_back(receipt);
    }
}

#[async_trait]
impl TxExecutor for MockTxExecutor {
    async fn send(&self, intent: TxIntent) -> SdkResult<Box<dyn PendingTx>> {
        self.sent.lock().unwrap().push(intent);
        let receipt = self
            .receipts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SdkError::Rpc("mock executor has no scripted receipt".to_string()))?;
        Ok(Box::new(MockPendingTx { receipt }))
    }
}

/// Blackbox replaying a scripted status sequence (last entry repeats) and
/// a fixed result payload.
pub struct MockBlackbox {
    pub statuses: Vec<JobStatus>,
    pub result_file_name: Option<String>,
    pub result_bytes: Vec<u8>,
    pub submissions: Mutex<Vec<JobRequest>>,
    pub status_fetches: AtomicU32,
    pub result_fetches: AtomicU32,
    /// Stale rejections to serve before accepting a submission.
    pub stale_rejections: AtomicU32,
}

impl MockBlackbox {
    pub fn completing(statuses: Vec<JobStatus>, result_file_name: Option<String>) -> Self {
        Self {
            statuses,
            result_file_name,
            result_bytes: b"mock-output".to_vec(),
            submissions: Mutex::new(Vec::new()),
            status_fetches: AtomicU32::new(0),
            result_fetches: AtomicU32::new(0),
            stale_rejections: AtomicU32::new(0),
        }
    }

    fn job(&self, job_type: JobType, status: JobStatus) -> JobInfo {
        JobInfo {
            id: "job-1".to_string(),
            job_type,
            status,
            progress: if status == JobStatus::Completed { 100 } else { 50 },
            secret_id: "7".to_string(),
            chain_id: 1,
            created_at: 1_700_000_000_000,
            completed_at: None,
            expired_at: None,
            error: match status {
                JobStatus::Failed => Some("key material unavailable".to_string()),
                _ => None,
            },
            result_file_name: if status == JobStatus::Completed {
                self.result_file_name.clone()
            } else {
                None
            },
            ttl: 3600,
            original_size: None,
        }
    }
}

#[async_trait]
impl BlackboxApi for MockBlackbox {
    async fn job_status(&self, _job_id: &str) -> SdkResult<JobInfo> {
        let n = self.status_fetches.fetch_add(1, Ordering::SeqCst) as usize;
        let status = *self
            .statuses
            .get(n)
            .or_else(|| self.statuses.last())
            .expect("scripted statuses must not be empty");
        let job_type = self
            .submissions
            .lock()
            .unwrap()
            .last()
            .map(|req| req.job_type)
            .unwrap_or(JobType::Encrypt);
        Ok(self.job(job_type, status))
    }

    async fn submit_job(&self, request: &JobRequest) -> SdkResult<JobInfo> {
        if self
            .stale_rejections
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(SdkError::BlockStale {
                used_block: request.auth.block_number,
                current_block: request.auth.block_number + 200,
                max_window: 100,
            });
        }
        self.submissions.lock().unwrap().push(request.clone());
        Ok(self.job(request.job_type, JobStatus::Pending))
    }

    async fn fetch_result(&self, _job_id: &str) -> SdkResult<Vec<u8>> {
        self.result_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.result_bytes.clone())
    }
}

/// Receipt carrying the given logs for a successful transaction.
pub fn receipt_with_logs(tx_hash: B256, block_number: u64, logs: Vec<LogEntry>) -> TxReceiptInfo {
    TxReceiptInfo {
        tx_hash,
        block_number,
        success: true,
        logs,
    }
}

/// A `SecretCreated` log assigning `secret_id`.
pub fn secret_created_log(secret_id: U256, owner: Address, block: u64) -> LogEntry {
    LogEntry {
        address: Address::ZERO,
        topics: vec![
            cifer_sdk::abi::secret_created_topic(),
            B256::from(secret_id.to_be_bytes::<32>()),
            owner.into_word(),
        ],
        data: Bytes::new(),
        block_number: block,
        log_index: 0,
        transaction_hash: None,
    }
}
