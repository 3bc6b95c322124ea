use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KickoffError {
    #[error("Jenkins API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Jenkins API error (status {status}) persisted after {retries} retries")]
    ApiErrorAfterRetries { status: u16, retries: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job {0} has no builds yet")]
    NoBuild(String),

    #[error("Unknown pipeline '{name}'. Valid pipelines are: {}", valid.join(", "))]
    InvalidJob { name: String, valid: Vec<String> },

    #[error("Failed to trigger {job}: {source}")]
    Trigger {
        job: String,
        #[source]
        source: Box<KickoffError>,
    },

    #[error("Lost track of {job} after {polls} polls: {source}")]
    Tracking {
        job: String,
        polls: u32,
        #[source]
        source: Box<KickoffError>,
    },

    #[error("No new build of {job} appeared within {waited:?}")]
    TrackingTimeout { job: String, waited: Duration },

    #[error("Interrupted during {0}")]
    Cancelled(String),

    #[error("No pipeline names given and stdin is not a terminal")]
    NotInteractive,
}

impl KickoffError {
    /// True for the "job has never built" condition, which callers may treat as absence.
    pub fn is_no_build(&self) -> bool {
        matches!(self, Self::NoBuild(_))
    }
}

pub type Result<T> = std::result::Result<T, KickoffError>;
