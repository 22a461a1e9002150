//! HTTP client for the Checky backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::models::{AnalysisReport, Article, JobStatus};

use super::backend::ContractApi;
use super::error::ApiError;
use super::types::{ChatReply, HealthResponse, StatusPayload, UploadReceipt};

/// Default per-request time budget.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client for the backend's HTTP API.
///
/// Status and result routes exist in two generations: `/analysis/*` on
/// current backends and `/upload/*` on older ones. Calls try the current
/// route first and fall back exactly once on HTTP 404.
#[derive(Debug)]
pub struct ApiClient {
    base: String,
    http: Client,
}

impl ApiClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Validate early so a bad config fails at startup, not mid-pipeline.
        Url::parse(base_url).map_err(|e| ApiError::BaseUrl(format!("{}: {}", base_url, e)))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Turn a non-success response into an `ApiError`, pulling the message
    /// out of the backend's JSON `detail` field when there is one.
    async fn error_from_response(resp: Response) -> ApiError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str().map(String::from)))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });
        ApiError::Http {
            status: status.as_u16(),
            detail,
        }
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        if !resp.status().is_success() {
            return Err(Self::error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!("GET {}", path);
        let resp = self.http.get(self.endpoint(path)).send().await?;
        Self::decode(resp).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        debug!("POST {}", path);
        let resp = self.http.post(self.endpoint(path)).json(body).send().await?;
        Self::decode(resp).await
    }

    /// GET `path`, retrying once against `fallback` if the route 404s.
    async fn get_json_with_fallback<T: DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        match self.get_json(path).await {
            Err(err) if err.is_not_found() => {
                debug!("{} not found, falling back to {}", path, fallback);
                self.get_json(fallback).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl ContractApi for ApiClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt, ApiError> {
        debug!("POST /upload ({}, {} bytes)", file_name, bytes.len());
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn job_status(&self, task_id: &str) -> Result<JobStatus, ApiError> {
        let payload: StatusPayload = self
            .get_json_with_fallback(
                &format!("/analysis/status/{}", task_id),
                &format!("/upload/status/{}", task_id),
            )
            .await?;
        Ok(payload.into_status())
    }

    async fn analysis_report(&self, task_id: &str) -> Result<AnalysisReport, ApiError> {
        self.get_json_with_fallback(
            &format!("/analysis/result/{}", task_id),
            &format!("/upload/analysis/{}", task_id),
        )
        .await
    }

    async fn analyze_articles(&self, articles: &[Article]) -> Result<AnalysisReport, ApiError> {
        let body = serde_json::json!({ "articles": articles });
        self.post_json("/contract/analyze", &body).await
    }

    async fn chat(&self, payload: &serde_json::Value) -> Result<ChatReply, ApiError> {
        self.post_json("/chat/", payload).await
    }

    async fn health(&self) -> Result<bool, ApiError> {
        let resp: HealthResponse = self.get_json("/health").await?;
        Ok(resp.ok)
    }
}
