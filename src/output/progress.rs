use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::pipelines::BuildHandle;

use super::styling::{failure, pending, success};

/// Spinner for the current stage: discovering pipelines, then waiting for a build.
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_discovery(server: &str) -> Self {
        let pb =
            create_spinner(pending(format!("Discovering pipelines on {server}")).to_string());
        Self { pb }
    }

    pub fn finish_discovery(self, count: usize) {
        self.pb
            .finish_with_message(success(format!("Found {count} pipelines ✓")).to_string());
    }

    pub fn start_trigger(job: &str) -> Self {
        let pb = create_spinner(
            pending(format!("Starting {job}, waiting for its build")).to_string(),
        );
        Self { pb }
    }

    pub fn finish_trigger(self, handle: &BuildHandle) {
        let message = format!("{} #{} started ✓", handle.job_name, handle.build.number);
        self.pb
            .finish_with_message(success(message).to_string());
    }

    pub fn abandon(self, message: &str) {
        self.pb
            .abandon_with_message(failure(format!("{message} ✗")).to_string());
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
