//! Analysis job state.

use serde::{Deserialize, Serialize};

/// Backend-reported status of an analysis job.
///
/// The backend's status vocabulary has grown over time, so anything we do
/// not recognize is kept verbatim in `Other` and treated as still running
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Uploaded,
    Completed,
    Failed,
    #[serde(untagged)]
    Other(String),
}

impl JobStatus {
    /// Parse a wire status string. Never fails; unknown strings land in `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "uploaded" => Self::Uploaded,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Uploaded => "uploaded",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    /// Whether the job has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether polling should continue. Unknown statuses count as running.
    pub fn is_in_progress(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-submission job record.
///
/// Each upload gets a fresh `Job`; the poll attempt counter lives here
/// rather than in any shared state, so concurrent or repeated submissions
/// cannot bleed into each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Task id assigned by the backend at upload time.
    pub id: String,
    /// Original filename as echoed back by the backend.
    pub file_name: String,
    /// Last observed status.
    pub status: JobStatus,
    /// Number of status polls issued for this job.
    pub attempts: u32,
}

impl Job {
    pub fn new(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            status: JobStatus::Queued,
            attempts: 0,
        }
    }

    /// Record the outcome of one status poll.
    pub fn record_poll(&mut self, status: JobStatus) {
        self.attempts += 1;
        self.status = status;
    }
}
