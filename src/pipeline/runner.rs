use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::ContractApi;
use crate::models::{Contract, Job, JobStatus};
use crate::segmenter;
use crate::utils::upload::{is_supported_extension, validate_upload};

use super::cancel::CancelToken;
use super::progress::{Progress, Stage};
use super::types::{AnalysisEvent, AnalysisOutcome, PipelineError, PollPolicy, TimeoutPolicy};

/// Drives one contract at a time through upload, polling, and result binding.
///
/// Holding `&mut self` across a run keeps at most one job live per session;
/// starting a new run replaces the previous job and resets the cancel flag.
pub struct AnalysisSession {
    api: Arc<dyn ContractApi>,
    policy: PollPolicy,
    cancel: CancelToken,
    contract: Option<Contract>,
    job: Option<Job>,
}

impl AnalysisSession {
    pub fn new(api: Arc<dyn ContractApi>, policy: PollPolicy) -> Self {
        Self {
            api,
            policy,
            cancel: CancelToken::new(),
            contract: None,
            job: None,
        }
    }

    /// Handle the owner can use to cancel the current (or next) run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Segmented contract from the most recent run, if any.
    pub fn contract(&self) -> Option<&Contract> {
        self.contract.as_ref()
    }

    /// Job state from the most recent run, if any.
    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// Reads a file from disk and runs it through the full analysis flow.
    pub async fn analyze_file(
        &mut self,
        path: &Path,
        events: mpsc::Sender<AnalysisEvent>,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PipelineError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        self.analyze_bytes(&file_name, bytes, events).await
    }

    /// Uploads raw bytes and follows the job to a bound result.
    ///
    /// Progress is reported through `events`; the final state is also kept
    /// on the session for later inspection.
    pub async fn analyze_bytes(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        events: mpsc::Sender<AnalysisEvent>,
    ) -> Result<AnalysisOutcome, PipelineError> {
        let result = self.run_analysis(file_name, bytes, &events).await;
        match &result {
            Err(PipelineError::Cancelled) | Ok(_) => {}
            Err(error) => {
                let _ = events
                    .send(AnalysisEvent::Failed {
                        error: error.to_string(),
                    })
                    .await;
            }
        }
        result
    }

    async fn run_analysis(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
        events: &mpsc::Sender<AnalysisEvent>,
    ) -> Result<AnalysisOutcome, PipelineError> {
        validate_upload(file_name, bytes.len() as u64).map_err(PipelineError::InvalidFile)?;
        if !is_supported_extension(file_name) {
            warn!("{file_name}: unrecognized file type, uploading anyway");
        }

        self.cancel.reset();
        self.job = None;
        self.contract = None;

        let receipt = self
            .api
            .upload(file_name, bytes)
            .await
            .map_err(PipelineError::Upload)?;
        info!(
            "upload accepted: task {} for {}",
            receipt.task_id, receipt.file_name
        );
        let mut job = Job::new(receipt.task_id.clone(), receipt.file_name.clone());
        let _ = events
            .send(AnalysisEvent::Submitted {
                job_id: job.id.clone(),
                file_name: job.file_name.clone(),
            })
            .await;

        let segmentation = segmenter::segment(&receipt.extracted_text);
        let mut contract = segmentation.contract;
        if segmentation.degraded {
            let _ = events
                .send(AnalysisEvent::SegmentationDegraded {
                    sentences: contract.sentence_count(),
                })
                .await;
        }
        self.contract = Some(contract.clone());

        let poll_result = self.poll_until_terminal(&mut job, events).await;
        self.job = Some(job.clone());
        poll_result?;

        let report = self
            .api
            .analysis_report(&job.id)
            .await
            .map_err(PipelineError::ResultFetch)?;
        let tallied = report.recount();
        if tallied != report.counts {
            debug!(
                "served counts {:?} disagree with local tally {:?}",
                report.counts, tallied
            );
        }

        contract.apply_report(&report);
        self.contract = Some(contract.clone());
        let _ = events
            .send(AnalysisEvent::Completed {
                attempts: job.attempts,
            })
            .await;
        info!(
            "analysis finished for task {} after {} polls",
            job.id, job.attempts
        );

        Ok(AnalysisOutcome {
            job,
            contract,
            report,
        })
    }

    /// Polls until the job is terminal, pacing by the session policy.
    ///
    /// The cancel flag is checked before each timer is scheduled and again
    /// when an in-flight response lands; once it is set, no further status
    /// request goes out and any response already on the wire is discarded.
    async fn poll_until_terminal(
        &self,
        job: &mut Job,
        events: &mpsc::Sender<AnalysisEvent>,
    ) -> Result<(), PipelineError> {
        let mut progress = Progress::start();
        let _ = events
            .send(AnalysisEvent::Progress {
                percent: progress.percent(),
                stage: Stage::Parsing,
            })
            .await;

        loop {
            if job.attempts >= self.policy.max_attempts {
                return match self.policy.on_timeout {
                    TimeoutPolicy::ForceComplete => {
                        warn!(
                            "task {} still pending after {} polls, treating as complete",
                            job.id, job.attempts
                        );
                        job.status = JobStatus::Completed;
                        let _ = events
                            .send(AnalysisEvent::Progress {
                                percent: progress.finish(),
                                stage: Stage::Completed,
                            })
                            .await;
                        Ok(())
                    }
                    TimeoutPolicy::ReportError => Err(PipelineError::PollBudgetExhausted {
                        attempts: job.attempts,
                    }),
                };
            }

            if self.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            tokio::time::sleep(self.policy.interval).await;
            if self.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let status = self
                .api
                .job_status(&job.id)
                .await
                .map_err(PipelineError::StatusPoll)?;
            if self.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            job.record_poll(status);
            debug!(
                "task {} poll {}: {}",
                job.id,
                job.attempts,
                job.status.as_str()
            );

            match &job.status {
                JobStatus::Completed => {
                    let _ = events
                        .send(AnalysisEvent::Progress {
                            percent: progress.finish(),
                            stage: Stage::Completed,
                        })
                        .await;
                    return Ok(());
                }
                JobStatus::Failed => return Err(PipelineError::AnalysisFailed),
                status => {
                    let _ = events
                        .send(AnalysisEvent::Progress {
                            percent: progress.advance(),
                            stage: Stage::for_status(status),
                        })
                        .await;
                }
            }
        }
    }
}
