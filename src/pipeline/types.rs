use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::models::{AnalysisReport, Contract, Job};

use super::progress::Stage;

/// Default delay between consecutive status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of polls before the timeout policy kicks in.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// What to do when the poll budget runs out before the job turns terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Treat the job as completed and fetch whatever result exists.
    #[default]
    ForceComplete,
    /// Surface the exhausted budget as an error instead.
    ReportError,
}

impl TimeoutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeoutPolicy::ForceComplete => "force_complete",
            TimeoutPolicy::ReportError => "report_error",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "force_complete" => Some(TimeoutPolicy::ForceComplete),
            "report_error" => Some(TimeoutPolicy::ReportError),
            _ => None,
        }
    }
}

/// Pacing for the status poll loop.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub on_timeout: TimeoutPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            on_timeout: TimeoutPolicy::default(),
        }
    }
}

/// Progress notifications emitted while an analysis runs.
///
/// Sends are best-effort: a dropped receiver never stalls the pipeline.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// The upload was accepted and the backend assigned a task id.
    Submitted { job_id: String, file_name: String },
    /// Local segmentation found no clause structure in the extracted text.
    SegmentationDegraded { sentences: usize },
    /// The progress estimate moved.
    Progress { percent: u8, stage: Stage },
    /// The job reached a successful end and the result is bound.
    Completed { attempts: u32 },
    /// The run ended in an error.
    Failed { error: String },
}

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub job: Job,
    pub contract: Contract,
    pub report: AnalysisReport,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidFile(String),

    #[error("failed to read {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload failed: {0}")]
    Upload(#[source] ApiError),

    #[error("status poll failed: {0}")]
    StatusPoll(#[source] ApiError),

    #[error("the backend reported the analysis as failed")]
    AnalysisFailed,

    #[error("failed to fetch the analysis result: {0}")]
    ResultFetch(#[source] ApiError),

    #[error("job did not finish within {attempts} polls")]
    PollBudgetExhausted { attempts: u32 },

    #[error("analysis cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_policy_defaults_to_force_complete() {
        assert_eq!(TimeoutPolicy::default(), TimeoutPolicy::ForceComplete);
        assert_eq!(PollPolicy::default().on_timeout, TimeoutPolicy::ForceComplete);
    }

    #[test]
    fn timeout_policy_parses_both_spellings() {
        assert_eq!(
            TimeoutPolicy::from_str("force_complete"),
            Some(TimeoutPolicy::ForceComplete)
        );
        assert_eq!(
            TimeoutPolicy::from_str("report-error"),
            Some(TimeoutPolicy::ReportError)
        );
        assert_eq!(TimeoutPolicy::from_str("ignore"), None);
    }

    #[test]
    fn poll_policy_default_pacing() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 30);
    }
}
