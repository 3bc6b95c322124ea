//! In-memory `BuildServer` with scripted responses, for exercising the core stages.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::{KickoffError, Result};

use super::server::{BuildServer, LogSink};
use super::types::{BuildRef, BuildState, JobRef};

pub const PIPELINE: &str = "org.jenkinsci.plugins.workflow.job.WorkflowJob";
pub const FOLDER: &str = "com.cloudbees.hudson.plugins.folder.Folder";

/// Scripted answer to one `last_build` call.
#[derive(Debug, Clone)]
pub enum LastBuild {
    Number(u64),
    Never,
    Fails(u16),
}

pub fn pipeline(name: &str) -> JobRef {
    JobRef::new(name, PIPELINE)
}

pub fn folder(name: &str) -> JobRef {
    JobRef::new(name, FOLDER)
}

#[derive(Default)]
pub struct ScriptedServer {
    roots: Vec<JobRef>,
    jobs: HashMap<String, JobRef>,
    failing_jobs: HashSet<String>,
    last_builds: Mutex<VecDeque<LastBuild>>,
    trigger_failure: Option<u16>,
    console_chunks: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedServer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_roots(mut self, roots: Vec<JobRef>) -> Self {
        self.roots = roots;
        self
    }

    /// Registers what `fetch_job(full_name)` returns.
    #[must_use]
    pub fn with_job(mut self, full_name: &str, job: JobRef) -> Self {
        self.jobs.insert(full_name.to_string(), job);
        self
    }

    #[must_use]
    pub fn with_failing_job(mut self, full_name: &str) -> Self {
        self.failing_jobs.insert(full_name.to_string());
        self
    }

    #[must_use]
    pub fn with_last_builds(self, script: impl IntoIterator<Item = LastBuild>) -> Self {
        self.last_builds.lock().unwrap().extend(script);
        self
    }

    #[must_use]
    pub fn with_trigger_failure(mut self, status: u16) -> Self {
        self.trigger_failure = Some(status);
        self
    }

    #[must_use]
    pub fn with_console(mut self, chunks: &[&str]) -> Self {
        self.console_chunks = chunks.iter().map(|c| (*c).to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BuildServer for ScriptedServer {
    async fn list_root_jobs(&self) -> Result<Vec<JobRef>> {
        self.record("list_root_jobs".to_string());
        Ok(self.roots.clone())
    }

    async fn fetch_job(&self, full_name: &str) -> Result<JobRef> {
        self.record(format!("fetch_job {full_name}"));
        if self.failing_jobs.contains(full_name) {
            return Err(KickoffError::Api {
                status: 500,
                message: "folder lookup failed".to_string(),
            });
        }
        self.jobs
            .get(full_name)
            .cloned()
            .ok_or_else(|| KickoffError::JobNotFound(full_name.to_string()))
    }

    async fn last_build(&self, job: &JobRef) -> Result<BuildRef> {
        self.record(format!("last_build {}", job.name));
        let next = self.last_builds.lock().unwrap().pop_front();
        match next {
            Some(LastBuild::Number(number)) => Ok(BuildRef {
                number,
                url: format!("https://ci.example.com/job/{}/{number}/", job.name),
                state: BuildState::Running,
            }),
            Some(LastBuild::Never) => Err(KickoffError::NoBuild(job.name.clone())),
            Some(LastBuild::Fails(status)) => Err(KickoffError::Api {
                status,
                message: "last build lookup failed".to_string(),
            }),
            None => Err(KickoffError::Api {
                status: 599,
                message: "last_build script exhausted".to_string(),
            }),
        }
    }

    async fn trigger_build(&self, job: &JobRef, params: &BTreeMap<String, String>) -> Result<()> {
        self.record(format!("trigger_build {} params={}", job.name, params.len()));
        match self.trigger_failure {
            Some(status) => Err(KickoffError::Api {
                status,
                message: "trigger rejected".to_string(),
            }),
            None => Ok(()),
        }
    }

    async fn stream_console_log(
        &self,
        log_path: &str,
        sink: LogSink<'_>,
        _poll_interval: Duration,
        _max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.record(format!("stream_console_log {log_path}"));
        for chunk in &self.console_chunks {
            if cancel.is_cancelled() {
                break;
            }
            sink.write_all(chunk.as_bytes()).await?;
        }
        sink.flush().await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[async_trait]
impl BuildServer for Arc<ScriptedServer> {
    async fn list_root_jobs(&self) -> Result<Vec<JobRef>> {
        (**self).list_root_jobs().await
    }

    async fn fetch_job(&self, full_name: &str) -> Result<JobRef> {
        (**self).fetch_job(full_name).await
    }

    async fn last_build(&self, job: &JobRef) -> Result<BuildRef> {
        (**self).last_build(job).await
    }

    async fn trigger_build(&self, job: &JobRef, params: &BTreeMap<String, String>) -> Result<()> {
        (**self).trigger_build(job, params).await
    }

    async fn stream_console_log(
        &self,
        log_path: &str,
        sink: LogSink<'_>,
        poll_interval: Duration,
        max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        (**self)
            .stream_console_log(log_path, sink, poll_interval, max_duration, cancel)
            .await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
