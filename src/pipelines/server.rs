use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

use super::types::{BuildRef, JobRef};

/// Byte sink for console output.
pub type LogSink<'a> = &'a mut (dyn AsyncWrite + Unpin + Send);

/// Remote operations the discovery, trigger and tail stages rely on.
///
/// Implementations are constructed explicitly and handed to each stage.
#[async_trait]
pub trait BuildServer: Send + Sync {
    /// Top level of the job tree. Children of folders may be left unfetched.
    async fn list_root_jobs(&self) -> Result<Vec<JobRef>>;

    /// Fetches a single node by fully-qualified name, with its direct children.
    async fn fetch_job(&self, full_name: &str) -> Result<JobRef>;

    /// Most recent build of `job`. Fails with `KickoffError::NoBuild` if it never ran.
    async fn last_build(&self, job: &JobRef) -> Result<BuildRef>;

    async fn trigger_build(&self, job: &JobRef, params: &BTreeMap<String, String>) -> Result<()>;

    /// Copies the console log at `log_path` into `sink` as it grows.
    ///
    /// Returns `Ok(())` when the build completes, when `max_duration` elapses,
    /// or when `cancel` fires.
    async fn stream_console_log(
        &self,
        log_path: &str,
        sink: LogSink<'_>,
        poll_interval: Duration,
        max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()>;

    fn name(&self) -> &str;
}
