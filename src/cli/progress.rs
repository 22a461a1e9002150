//! Progress display for the analyze command.

use indicatif::{ProgressBar, ProgressStyle};

use crate::pipeline::Stage;

/// Percent bar fed by pipeline progress events.
pub struct AnalysisProgress {
    bar: ProgressBar,
}

impl AnalysisProgress {
    pub fn new(file_name: &str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix} [{bar:40.cyan/dim}] {percent:>3}% {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.set_prefix(file_name.to_string());
        bar.set_message(Stage::Uploading.label());
        Self { bar }
    }

    pub fn update(&self, percent: u8, stage: Stage) {
        self.bar.set_position(percent as u64);
        self.bar.set_message(stage.label());
    }

    /// Print a line above the live bar without garbling it.
    pub fn println(&self, line: String) {
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
