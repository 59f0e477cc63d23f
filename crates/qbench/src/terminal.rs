//! Terminal UI: a spinner per benchmark run and styled status lines.

use std::borrow::Cow;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qbench::benchmark::output::Trailer;
use qbench::pipeline::Observer;

/// Spinner for indeterminate progress.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
        {
            bar.set_style(spinner);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn finish_with_success(&self, message: &str) {
        self.bar.finish_and_clear();
        success(message);
    }

    pub fn finish_with_warning(&self, message: &str) {
        self.bar.finish_and_clear();
        warning(message);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Shows one spinner per run while the child executes.
#[derive(Default)]
pub struct RunProgress {
    label: String,
    spinner: Option<Spinner>,
}

impl RunProgress {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            spinner: None,
        }
    }
}

impl Observer for RunProgress {
    fn run_started(&mut self, run: u32, total: u32) {
        self.spinner = Some(Spinner::new(format!("[{run}/{total}] {}", self.label)));
    }

    fn run_finished(&mut self, trailer: &Trailer) {
        let Some(spinner) = self.spinner.take() else {
            return;
        };
        let message = format!(
            "run {} finished in {:.3}s (retval={})",
            trailer.run, trailer.duration, trailer.retval
        );
        if trailer.retval == 0 {
            spinner.finish_with_success(&message);
        } else {
            spinner.finish_with_warning(&message);
        }
    }
}

// ============================================================================
// Styled output helpers
// ============================================================================

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print a path output (like "-> /path/to/file").
pub fn path_output(path: &std::path::Path) {
    eprintln!("  {} {}", style("→").dim(), style(path.display()).dim());
}
