//! Analysis pipeline: upload, poll, fetch, bind.
//!
//! [`AnalysisSession`] drives one contract through the backend's async
//! analysis flow, emitting [`AnalysisEvent`]s over an mpsc channel for the
//! CLI's progress display. All waiting is sequential; there is exactly one
//! outstanding request or timer at any moment.

mod cancel;
mod progress;
mod runner;
mod types;

pub use cancel::CancelToken;
pub use progress::{Progress, Stage};
pub use runner::AnalysisSession;
pub use types::{
    AnalysisEvent, AnalysisOutcome, PipelineError, PollPolicy, TimeoutPolicy, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};
