use std::time::Duration;

use log::info;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{KickoffError, Result};

use super::server::{BuildServer, LogSink};
use super::types::BuildHandle;

pub const DEFAULT_TAIL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_TAIL: Duration = Duration::from_secs(100 * 60 * 60);

#[derive(Debug, Clone)]
pub struct TailOptions {
    pub poll_interval: Duration,
    /// Stop following after this long, even if the build is still running
    pub max_duration: Duration,
    pub cancel: CancellationToken,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_TAIL_INTERVAL,
            max_duration: DEFAULT_MAX_TAIL,
            cancel: CancellationToken::new(),
        }
    }
}

/// Server-relative path of a build, taken from its absolute URL.
pub fn log_path(build_url: &str) -> Result<String> {
    let url = Url::parse(build_url)
        .map_err(|e| KickoffError::InvalidUrl(format!("{build_url}: {e}")))?;
    Ok(url.path().to_string())
}

/// Streams the console output of `handle` into `sink` from the first byte.
///
/// Reaching `max_duration` or cancellation ends tailing normally.
pub async fn tail(
    server: &dyn BuildServer,
    handle: &BuildHandle,
    sink: LogSink<'_>,
    options: &TailOptions,
) -> Result<()> {
    let path = log_path(&handle.build.url)?;
    info!("Tailing {} #{} from {path}", handle.job_name, handle.build.number);

    server
        .stream_console_log(
            &path,
            sink,
            options.poll_interval,
            options.max_duration,
            &options.cancel,
        )
        .await
}
