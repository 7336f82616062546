//! Progress display for interactive runs

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

/// Spinner tracking the collapse steps of one generation
pub struct GenerationProgress {
    bar: ProgressBar,
}

impl GenerationProgress {
    /// Create and start the spinner
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(SPINNER_STYLE.clone());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Update the displayed step count
    pub fn update(&self, attempt: usize, steps: usize) {
        self.bar
            .set_message(format!("attempt {attempt}, {steps} cells collapsed"));
    }

    /// Stop the spinner with a closing message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self::new()
    }
}
