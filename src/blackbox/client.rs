//! HTTP client for the Blackbox job API.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::blackbox::types::{JobEnvelope, JobInfo, JobType};
use crate::error::{SdkError, SdkResult};
use crate::freshness::auth::AuthMaterial;

/// A job submission: what to run, over which secret, with which signed
/// authentication material.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_type: JobType,
    pub secret_id: String,
    pub chain_id: u64,
    pub auth: AuthMaterial,
    /// Input bytes (plaintext for encrypt jobs, cifer payload for decrypt).
    pub data: Vec<u8>,
    pub file_name: Option<String>,
}

/// Blackbox API surface the flows consume. A trait so tests can script
/// response sequences without a live cluster.
#[async_trait]
pub trait BlackboxApi: Send + Sync {
    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &str) -> SdkResult<JobInfo>;

    /// Submit a new encrypt/decrypt job.
    async fn submit_job(&self, request: &JobRequest) -> SdkResult<JobInfo>;

    /// Download the output of a completed job.
    async fn fetch_result(&self, job_id: &str) -> SdkResult<Vec<u8>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    #[serde(rename = "type")]
    job_type: JobType,
    secret_id: &'a str,
    chain_id: u64,
    auth: &'a AuthMaterial,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    used_block: Option<u64>,
    #[serde(default)]
    current_block: Option<u64>,
    #[serde(default)]
    max_window_blocks: Option<u64>,
}

/// Production client over reqwest.
#[derive(Debug, Clone)]
pub struct HttpBlackboxClient {
    client: Client,
    base_url: Url,
}

impl HttpBlackboxClient {
    /// Create a client for the given service base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Map a non-success response body to the SDK taxonomy. A server-side
    /// stale-block rejection becomes `BlockStale` so the freshness guard
    /// can retry it with a fresh head.
    fn map_error(status: reqwest::StatusCode, body: &str) -> SdkError {
        if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
            if let Some(detail) = parsed.error {
                if detail.code.as_deref() == Some("stale_block") {
                    return SdkError::BlockStale {
                        used_block: detail.used_block.unwrap_or_default(),
                        current_block: detail.current_block.unwrap_or_default(),
                        max_window: detail.max_window_blocks.unwrap_or_default(),
                    };
                }
                if let Some(message) = detail.message {
                    return SdkError::Api(format!("{}: {}", status, message));
                }
            }
        }
        SdkError::Api(format!("{}: {}", status, body))
    }

    async fn read_envelope(response: reqwest::Response) -> SdkResult<JobInfo> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SdkError::Api(format!("reading response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::map_error(status, &text));
        }

        let envelope: JobEnvelope = serde_json::from_str(&text)
            .map_err(|e| SdkError::Api(format!("malformed job envelope: {}", e)))?;
        if !envelope.success {
            return Err(SdkError::Api("service reported success=false".to_string()));
        }
        Ok(envelope.job)
    }
}

#[async_trait]
impl BlackboxApi for HttpBlackboxClient {
    async fn job_status(&self, job_id: &str) -> SdkResult<JobInfo> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/v1/jobs/{}", job_id)))
            .send()
            .await
            .map_err(|e| SdkError::Api(format!("job status request: {}", e)))?;
        Self::read_envelope(response).await
    }

    async fn submit_job(&self, request: &JobRequest) -> SdkResult<JobInfo> {
        let body = SubmitBody {
            job_type: request.job_type,
            secret_id: &request.secret_id,
            chain_id: request.chain_id,
            auth: &request.auth,
            data: base64::engine::general_purpose::STANDARD.encode(&request.data),
            file_name: request.file_name.as_deref(),
        };

        // Client-generated id so a submission can be correlated across
        // service logs even when it never becomes a job.
        let request_id = Uuid::new_v4();
        let response = self
            .client
            .post(self.endpoint("/api/v1/jobs"))
            .header("x-request-id", request_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| SdkError::Api(format!("job submission: {}", e)))?;
        tracing::debug!(%request_id, kind = ?request.job_type, "job submitted");
        Self::read_envelope(response).await
    }

    async fn fetch_result(&self, job_id: &str) -> SdkResult<Vec<u8>> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/v1/jobs/{}/result", job_id)))
            .send()
            .await
            .map_err(|e| SdkError::Api(format!("result download: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::map_error(status, &text));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SdkError::Api(format!("reading result body: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_block_rejection_mapped() {
        let body = r#"{"success":false,"error":{"code":"stale_block","usedBlock":90,"currentBlock":210,"maxWindowBlocks":100}}"#;
        let err = HttpBlackboxClient::map_error(reqwest::StatusCode::UNAUTHORIZED, body);
        match err {
            SdkError::BlockStale {
                used_block,
                current_block,
                max_window,
            } => {
                assert_eq!(used_block, 90);
                assert_eq!(current_block, 210);
                assert_eq!(max_window, 100);
            }
            other => panic!("expected BlockStale, got {other}"),
        }
    }

    #[test]
    fn test_plain_error_mapped_to_api() {
        let body = r#"{"success":false,"error":{"message":"secret not found"}}"#;
        let err = HttpBlackboxClient::map_error(reqwest::StatusCode::NOT_FOUND, body);
        assert!(matches!(err, SdkError::Api(_)));
        assert!(err.to_string().contains("secret not found"));
    }

    #[test]
    fn test_endpoint_join() {
        let client = HttpBlackboxClient::new("https://blackbox.example/".parse().unwrap());
        assert_eq!(
            client.endpoint("/api/v1/jobs/j1"),
            "https://blackbox.example/api/v1/jobs/j1"
        );
    }
}
