use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_yellow};

/// Spinner shown on stderr while job rows resolve
pub struct ResolveProgress {
    pb: ProgressBar,
}

impl ResolveProgress {
    pub fn start(jobs: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
            pb.set_style(style);
        }
        pb.set_message(bright_yellow(format!("Looking up last run of {jobs} jobs")).to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    #[cfg(test)]
    pub fn spinner(&self) -> ProgressBar {
        self.pb.clone()
    }

    pub fn clear(self) {
        self.pb.finish_and_clear();
    }

    pub fn finish(self, resolved: usize) {
        self.pb
            .finish_with_message(bright_green(format!("Resolved {resolved} jobs ✓")).to_string());
    }
}
