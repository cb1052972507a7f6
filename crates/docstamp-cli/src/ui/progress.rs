//! Progress bar for generation runs.

use indicatif::{ProgressBar, ProgressStyle};

use docstamp::ProgressSink;

/// [`ProgressSink`] drawing an indicatif bar on stderr.
///
/// The bar is hidden when `quiet` is set or stderr is not attended, so
/// piped output stays clean.
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet || !console::user_attended_stderr() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓▒░"),
            );
            bar
        };
        Self { bar }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl ProgressSink for GenerationProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, label: &str) {
        self.bar.set_message(label.to_string());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
