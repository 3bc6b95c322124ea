use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::error::{KickoffError, Result};

use super::server::BuildServer;
use super::types::{BuildHandle, BuildRef, JobRef};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct TrackOptions {
    /// Pause between two "last build" lookups
    pub poll_interval: Duration,
    /// Give up if no new build shows up in this time. `None` waits forever.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// Outcome of a successful trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked {
    pub handle: BuildHandle,
    /// Number of post-trigger lookups it took to see the new build
    pub polls: u32,
}

/// Starts a build of `job` and waits until a build number other than the
/// pre-trigger one is reported.
///
/// The server does not say which build a trigger created, so this compares
/// the last build before and after. If someone else starts `job` in between,
/// their build is the one returned.
///
/// Lookup errors are handled as follows:
/// - before the trigger: the job is treated as never built (number 0)
/// - first poll after the trigger: ignored, the server may lag behind
/// - any later poll: returned as `KickoffError::Tracking`
///
/// A failing trigger call is returned as `KickoffError::Trigger` and never retried.
pub async fn trigger_and_track(
    server: &dyn BuildServer,
    job: &JobRef,
    options: &TrackOptions,
) -> Result<Tracked> {
    if options.cancel.is_cancelled() {
        return Err(KickoffError::Cancelled(job.name.clone()));
    }

    let previous = match server.last_build(job).await {
        Ok(build) => build,
        Err(e) if e.is_no_build() => {
            debug!("{} has never been built", job.name);
            BuildRef::none()
        }
        Err(e) => {
            debug!("No previous build for {} ({e}), assuming none", job.name);
            BuildRef::none()
        }
    };
    if !previous.is_none() {
        debug!("Last build of {} before trigger: #{}", job.name, previous.number);
    }

    if options.cancel.is_cancelled() {
        return Err(KickoffError::Cancelled(job.name.clone()));
    }
    server
        .trigger_build(job, &BTreeMap::new())
        .await
        .map_err(|e| KickoffError::Trigger {
            job: job.name.clone(),
            source: Box::new(e),
        })?;
    info!("Triggered {}, waiting for a new build", job.name);

    let started = Instant::now();
    let mut polls: u32 = 0;

    loop {
        if options.cancel.is_cancelled() {
            return Err(KickoffError::Cancelled(job.name.clone()));
        }
        if let Some(timeout) = options.timeout {
            if started.elapsed() >= timeout {
                return Err(KickoffError::TrackingTimeout {
                    job: job.name.clone(),
                    waited: started.elapsed(),
                });
            }
        }

        let first = polls == 0;
        polls += 1;

        match server.last_build(job).await {
            Ok(last) if last.number != previous.number => {
                info!("Build #{} of {} appeared after {polls} polls", last.number, job.name);
                return Ok(Tracked {
                    handle: BuildHandle {
                        job_name: job.name.clone(),
                        build: last,
                    },
                    polls,
                });
            }
            Ok(last) => debug!("Poll {polls}: {} still at #{}", job.name, last.number),
            Err(e) if first => debug!("Poll {polls}: ignoring lookup error for {}: {e}", job.name),
            Err(e) => {
                return Err(KickoffError::Tracking {
                    job: job.name.clone(),
                    polls,
                    source: Box::new(e),
                })
            }
        }

        tokio::select! {
            () = tokio::time::sleep(options.poll_interval) => {}
            () = options.cancel.cancelled() => {}
        }
    }
}
