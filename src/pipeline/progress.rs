//! Progress estimation for the poll loop.
//!
//! The backend reports no percentage, so the client synthesizes one: a fixed
//! starting value after upload, a small bump per poll capped below completion,
//! and a snap to 100 once the job turns terminal. The estimate never moves
//! backwards.

use crate::models::JobStatus;

/// Shown immediately after the upload is accepted.
pub const INITIAL_PERCENT: u8 = 10;

/// Added per in-progress poll response.
pub const STEP_PERCENT: u8 = 5;

/// Ceiling while the job is still running.
pub const HOLD_PERCENT: u8 = 90;

/// Value reported once the job is terminal.
pub const DONE_PERCENT: u8 = 100;

/// Coarse phase of the run, derived from the last observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Parsing,
    Analyzing,
    Completed,
}

impl Stage {
    /// Maps a job status onto the stage the display should show.
    /// Unrecognized statuses count as analysis still underway.
    pub fn for_status(status: &JobStatus) -> Self {
        match status {
            JobStatus::Queued | JobStatus::Uploaded => Stage::Parsing,
            JobStatus::Processing | JobStatus::Other(_) => Stage::Analyzing,
            JobStatus::Completed => Stage::Completed,
            JobStatus::Failed => Stage::Analyzing,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Uploading => "Uploading your file",
            Stage::Parsing => "Reading your document",
            Stage::Analyzing => "Analyzing the contract",
            Stage::Completed => "Analysis complete",
        }
    }
}

/// Monotonic percentage estimate for one run.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    percent: u8,
}

impl Progress {
    /// Fresh estimate, positioned just past the upload.
    pub fn start() -> Self {
        Self {
            percent: INITIAL_PERCENT,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// One in-progress poll elapsed; returns the new estimate.
    pub fn advance(&mut self) -> u8 {
        self.percent = (self.percent + STEP_PERCENT).min(HOLD_PERCENT);
        self.percent
    }

    /// The job turned terminal; returns the final estimate.
    pub fn finish(&mut self) -> u8 {
        self.percent = DONE_PERCENT;
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_past_zero() {
        assert_eq!(Progress::start().percent(), 10);
    }

    #[test]
    fn advances_monotonically_and_holds_below_done() {
        let mut progress = Progress::start();
        let mut last = progress.percent();
        for _ in 0..40 {
            let next = progress.advance();
            assert!(next >= last);
            assert!(next <= HOLD_PERCENT);
            last = next;
        }
        assert_eq!(progress.percent(), HOLD_PERCENT);
    }

    #[test]
    fn finish_snaps_to_done() {
        let mut progress = Progress::start();
        progress.advance();
        assert_eq!(progress.finish(), DONE_PERCENT);
    }

    #[test]
    fn unknown_status_maps_to_analyzing() {
        let status = JobStatus::Other("reticulating".into());
        assert_eq!(Stage::for_status(&status), Stage::Analyzing);
    }

    #[test]
    fn early_statuses_map_to_parsing() {
        assert_eq!(Stage::for_status(&JobStatus::Queued), Stage::Parsing);
        assert_eq!(Stage::for_status(&JobStatus::Uploaded), Stage::Parsing);
    }
}
