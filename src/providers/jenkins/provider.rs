use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::{KickoffError, Result};
use crate::output::{self, PhaseProgress};
use crate::pipelines::{
    self, BuildHandle, BuildServer, Catalog, ClassMarker, DiscoveryOptions, JobRef, LogSink,
    Picker, TailOptions, TrackOptions,
};

use super::client::JenkinsClient;

/// Starts Jenkins pipelines and follows the builds they produce.
///
/// Runs the stages in order: discover the job catalog, resolve which
/// pipelines to start, trigger and track each one, then optionally tail its
/// console.
pub struct JenkinsProvider {
    server: Box<dyn BuildServer>,
    classifier: ClassMarker,
    discovery: DiscoveryOptions,
    track: TrackOptions,
    tail: TailOptions,
}

impl JenkinsProvider {
    /// Creates a provider talking to the Jenkins instance in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if no Jenkins URL is configured or it cannot be parsed.
    pub fn new(config: &Config, filter: Option<String>, cancel: CancellationToken) -> Result<Self> {
        let url = config.jenkins.url.as_deref().ok_or_else(|| {
            KickoffError::Config("No Jenkins URL configured (use --url or JENKINS_URL)".into())
        })?;
        let credentials = Credentials::from_parts(
            config.jenkins.user.as_deref(),
            config.jenkins.token.as_deref(),
        );
        if credentials.is_none() {
            info!("No credentials configured, using anonymous access");
        }

        let client = JenkinsClient::new(url, credentials, config.jenkins.request_timeout())?;

        Ok(Self::with_server(Box::new(client), config, filter, cancel))
    }

    /// Creates a provider on top of any `BuildServer`.
    pub fn with_server(
        server: Box<dyn BuildServer>,
        config: &Config,
        filter: Option<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            server,
            classifier: ClassMarker::new(config.jenkins.pipeline_class_markers.iter().cloned()),
            discovery: DiscoveryOptions {
                filter,
                max_depth: config.jenkins.max_folder_depth,
                cancel: cancel.clone(),
            },
            track: TrackOptions {
                poll_interval: config.tracking.poll_interval(),
                timeout: config.tracking.timeout(),
                cancel: cancel.clone(),
            },
            tail: TailOptions {
                poll_interval: config.tail.poll_interval(),
                max_duration: config.tail.max_duration(),
                cancel,
            },
        }
    }

    /// Flattens the job tree into the catalog of startable pipelines.
    pub async fn discover(&self) -> Result<Catalog> {
        let progress = PhaseProgress::start_discovery(self.server.name());

        match Catalog::discover(self.server.as_ref(), &self.classifier, &self.discovery).await {
            Ok(catalog) => {
                progress.finish_discovery(catalog.len());
                if catalog.is_empty() {
                    warn!("No pipelines found on {}", self.server.name());
                }
                Ok(catalog)
            }
            Err(e) => {
                progress.abandon("Discovery failed");
                Err(e)
            }
        }
    }

    /// Resolves `names` (or an interactively picked pipeline when empty) to
    /// catalog entries, without starting anything.
    pub async fn resolve(&self, names: &[String], picker: &dyn Picker) -> Result<Vec<JobRef>> {
        let catalog = self.discover().await?;
        pipelines::select(&catalog, names, picker)?
            .into_iter()
            .map(|name| {
                catalog
                    .get(&name)
                    .cloned()
                    .ok_or(KickoffError::JobNotFound(name))
            })
            .collect()
    }

    /// Starts `jobs` one after another. The first failure stops the remaining
    /// starts, and so does cancellation: no build is triggered once the token
    /// has fired.
    ///
    /// When `follow` is set, each build's console is copied into `sink` before
    /// the next pipeline is started.
    pub async fn start(
        &self,
        jobs: &[JobRef],
        follow: bool,
        sink: LogSink<'_>,
    ) -> Result<Vec<BuildHandle>> {
        let mut handles = Vec::with_capacity(jobs.len());
        for job in jobs {
            if self.track.cancel.is_cancelled() {
                warn!(
                    "Interrupted, not starting {} remaining pipeline(s)",
                    jobs.len() - handles.len()
                );
                return Err(KickoffError::Cancelled(job.name.clone()));
            }

            let progress = PhaseProgress::start_trigger(&job.name);
            let result = pipelines::trigger_and_track(self.server.as_ref(), job, &self.track).await;
            let tracked = match result {
                Ok(tracked) => tracked,
                Err(e) => {
                    progress.abandon(&format!("Could not start {}", job.name));
                    return Err(e);
                }
            };
            progress.finish_trigger(&tracked.handle);

            output::print_started(&tracked.handle);

            if follow {
                output::print_tailing(&tracked.handle);
                pipelines::tail(self.server.as_ref(), &tracked.handle, &mut *sink, &self.tail)
                    .await?;
            }

            handles.push(tracked.handle);
        }

        Ok(handles)
    }
}
