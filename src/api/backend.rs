//! Shared abstraction over the Checky HTTP API.

use async_trait::async_trait;

use crate::models::{AnalysisReport, Article, JobStatus};

use super::error::ApiError;
use super::types::{ChatReply, UploadReceipt};

/// The backend operations the client drives.
///
/// [`ApiClient`](super::ApiClient) implements this over HTTP; tests swap in
/// [`MockApi`](super::MockApi) with scripted responses so orchestration
/// logic can be exercised without a server.
#[async_trait]
pub trait ContractApi: Send + Sync {
    /// Submit a file for analysis.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError>;

    /// Poll the status of a running job.
    async fn job_status(&self, task_id: &str) -> Result<JobStatus, ApiError>;

    /// Fetch the finished analysis for a job.
    async fn analysis_report(&self, task_id: &str) -> Result<AnalysisReport, ApiError>;

    /// Analyze pre-segmented articles synchronously.
    async fn analyze_articles(&self, articles: &[Article]) -> Result<AnalysisReport, ApiError>;

    /// Send one chat request with an already-encoded payload.
    ///
    /// Payload shape negotiation happens a layer up; this just posts
    /// whatever it is given.
    async fn chat(&self, payload: &serde_json::Value) -> Result<ChatReply, ApiError>;

    /// Whether the backend reports itself healthy.
    async fn health(&self) -> Result<bool, ApiError>;
}
