mod catalog;
mod classify;
mod selector;
mod server;
mod tailer;
mod tracker;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{Catalog, DiscoveryOptions};
pub use classify::ClassMarker;
pub use selector::{default_choice, select, Picker};
pub use server::{BuildServer, LogSink};
pub use tailer::{tail, TailOptions};
pub use tracker::{trigger_and_track, TrackOptions};
pub use types::{BuildHandle, BuildRef, BuildState, JobRef};
