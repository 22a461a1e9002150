//! Scripted mock backend for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::{AnalysisReport, Article, JobStatus, RiskCounts};

use super::backend::ContractApi;
use super::error::ApiError;
use super::types::{ChatReply, UploadReceipt};

/// Mock backend with scripted responses and call counters.
///
/// Status polls walk through the configured script and repeat the final
/// entry once it runs out, so a job can be held in `processing` for as many
/// polls as a test needs.
#[derive(Default)]
pub struct MockApi {
    upload_script: Mutex<Option<Result<UploadReceipt, ApiError>>>,
    status_script: Mutex<Vec<Result<JobStatus, ApiError>>>,
    status_cursor: AtomicUsize,
    status_delay: Mutex<Option<Duration>>,
    report_script: Mutex<Option<Result<AnalysisReport, ApiError>>>,
    chat_accept_keys: Mutex<Option<Vec<String>>>,
    chat_answer: Mutex<Option<String>>,

    upload_calls: AtomicUsize,
    status_calls: AtomicUsize,
    report_calls: AtomicUsize,
    chat_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload(self, receipt: UploadReceipt) -> Self {
        *self.upload_script.lock().unwrap() = Some(Ok(receipt));
        self
    }

    pub fn with_upload_error(self, err: ApiError) -> Self {
        *self.upload_script.lock().unwrap() = Some(Err(err));
        self
    }

    /// Script the status polls; entries past the end repeat the last one.
    pub fn with_statuses(self, statuses: Vec<JobStatus>) -> Self {
        *self.status_script.lock().unwrap() = statuses.into_iter().map(Ok).collect();
        self
    }

    /// Full status script including failures at specific positions.
    pub fn with_status_script(self, script: Vec<Result<JobStatus, ApiError>>) -> Self {
        *self.status_script.lock().unwrap() = script;
        self
    }

    /// Delay each status response, to leave a window for cancellation.
    pub fn with_status_delay(self, delay: Duration) -> Self {
        *self.status_delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn with_report(self, report: AnalysisReport) -> Self {
        *self.report_script.lock().unwrap() = Some(Ok(report));
        self
    }

    pub fn with_report_error(self, err: ApiError) -> Self {
        *self.report_script.lock().unwrap() = Some(Err(err));
        self
    }

    /// Accept only chat payloads whose top-level keys match exactly.
    pub fn accept_chat_keys(self, keys: &[&str]) -> Self {
        let mut keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        keys.sort();
        *self.chat_accept_keys.lock().unwrap() = Some(keys);
        self
    }

    /// Reject every chat payload with HTTP 422.
    pub fn reject_all_chat(self) -> Self {
        *self.chat_accept_keys.lock().unwrap() = Some(Vec::new());
        self
    }

    pub fn with_chat_answer(self, answer: &str) -> Self {
        *self.chat_answer.lock().unwrap() = Some(answer.to_string());
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn report_calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContractApi for MockApi {
    async fn upload(&self, file_name: &str, _bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        match self.upload_script.lock().unwrap().clone() {
            Some(scripted) => scripted,
            None => Ok(UploadReceipt {
                task_id: "mock-task".to_string(),
                file_name: file_name.to_string(),
                extracted_text: String::new(),
            }),
        }
    }

    async fn job_status(&self, _task_id: &str) -> Result<JobStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.status_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let cursor = self.status_cursor.fetch_add(1, Ordering::SeqCst);
        let script = self.status_script.lock().unwrap();
        match script.get(cursor).or_else(|| script.last()) {
            Some(entry) => entry.clone(),
            None => Ok(JobStatus::Processing),
        }
    }

    async fn analysis_report(&self, task_id: &str) -> Result<AnalysisReport, ApiError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        match self.report_script.lock().unwrap().clone() {
            Some(scripted) => scripted,
            None => Err(ApiError::Http {
                status: 404,
                detail: format!("no result for {}", task_id),
            }),
        }
    }

    async fn analyze_articles(&self, articles: &[Article]) -> Result<AnalysisReport, ApiError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        match self.report_script.lock().unwrap().clone() {
            Some(scripted) => scripted,
            None => {
                let counts = RiskCounts::tally(articles);
                Ok(AnalysisReport {
                    articles: articles.to_vec(),
                    safety_percent: counts.safety_percent(),
                    counts,
                    title: None,
                    file_name: None,
                })
            }
        }
    }

    async fn chat(&self, payload: &serde_json::Value) -> Result<ChatReply, ApiError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);

        let accepted = match self.chat_accept_keys.lock().unwrap().clone() {
            None => true,
            Some(accept) => {
                let mut keys: Vec<String> = payload
                    .as_object()
                    .map(|obj| obj.keys().cloned().collect())
                    .unwrap_or_default();
                keys.sort();
                keys == accept
            }
        };

        if !accepted {
            return Err(ApiError::Http {
                status: 422,
                detail: "Unprocessable Entity".to_string(),
            });
        }

        Ok(ChatReply {
            answer: self.chat_answer.lock().unwrap().clone(),
            message: None,
            conversation_history: None,
        })
    }

    async fn health(&self) -> Result<bool, ApiError> {
        Ok(true)
    }
}
