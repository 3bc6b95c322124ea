mod progress;
mod styling;
mod tables;

pub use progress::PhaseProgress;
pub use styling::{accent, emphasis, heading, muted};
pub use tables::catalog_table;

use crate::pipelines::BuildHandle;

/// Prints the `kickoff` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        heading("🚀 kickoff"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Jenkins pipeline starter")
    );
}

/// Announces a resolved build and where its console lives.
pub fn print_started(handle: &BuildHandle) {
    eprintln!(
        "Started build of {} at {}",
        accent(&handle.job_name),
        accent(&handle.build.url)
    );
    eprintln!("{} {}", emphasis("view the log at:"), accent(handle.console_url()));
}

pub fn print_tailing(handle: &BuildHandle) {
    eprintln!(
        "{} {}",
        emphasis("tailing the log of"),
        accent(format!("{} #{}", handle.job_name, handle.build.number))
    );
}
