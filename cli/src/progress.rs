//! Terminal progress for batch runs.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docpack::{BatchObserver, BatchOutcome, BatchReport};

/// Drives an indicatif progress bar from batch notifications.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchObserver for ProgressObserver {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("converting...");
    }

    fn on_file_done(&self, outcome: &BatchOutcome, done: usize, _total: usize) {
        if outcome.success {
            self.bar.set_message(outcome.file_name());
        } else {
            self.bar.println(format!(
                "{} {}: {}",
                "Failed".red(),
                outcome.file_name(),
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
        self.bar.set_position(done as u64);
    }

    fn on_finish(&self, _report: &BatchReport) {
        self.bar.finish_with_message("Done!");
    }
}
