mod builds;
mod console;
mod core;
mod jobs;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipelines::{BuildRef, BuildServer, JobRef, LogSink};

pub use self::core::JenkinsClient;

#[async_trait]
impl BuildServer for JenkinsClient {
    async fn list_root_jobs(&self) -> Result<Vec<JobRef>> {
        self.fetch_root_jobs().await
    }

    async fn fetch_job(&self, full_name: &str) -> Result<JobRef> {
        self.fetch_job_by_name(full_name).await
    }

    async fn last_build(&self, job: &JobRef) -> Result<BuildRef> {
        self.fetch_last_build(job).await
    }

    async fn trigger_build(&self, job: &JobRef, params: &BTreeMap<String, String>) -> Result<()> {
        self.start_build(job, params).await
    }

    async fn stream_console_log(
        &self,
        log_path: &str,
        sink: LogSink<'_>,
        poll_interval: Duration,
        max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.follow_console(log_path, sink, poll_interval, max_duration, cancel)
            .await
    }

    fn name(&self) -> &str {
        "Jenkins"
    }
}
