use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::header::HeaderMap;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::pipelines::LogSink;
use crate::providers::jenkins::links;

use super::core::JenkinsClient;

const TEXT_SIZE_HEADER: &str = "x-text-size";
const MORE_DATA_HEADER: &str = "x-more-data";

impl JenkinsClient {
    /// Follows `<build>/logText/progressiveText`, writing each new chunk to `sink`
    /// as soon as it arrives.
    pub async fn follow_console(
        &self,
        build_path: &str,
        sink: LogSink<'_>,
        poll_interval: Duration,
        max_duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let console_url = links::console_text_url(&self.base_url, build_path)?;
        let started = Instant::now();
        let mut offset: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                info!("Stopped tailing {build_path}: cancelled");
                return Ok(());
            }
            if started.elapsed() >= max_duration {
                info!("Stopped tailing {build_path} after {max_duration:?}");
                return Ok(());
            }

            let mut url = console_url.clone();
            url.query_pairs_mut()
                .append_pair("start", &offset.to_string());

            let mut response = self.get(&url).await?;
            let (text_size, more) = progress(response.headers());

            while let Some(chunk) = response.chunk().await? {
                sink.write_all(&chunk).await?;
            }
            sink.flush().await?;

            if !more {
                return Ok(());
            }
            let Some(next_offset) = text_size else {
                warn!("Stopped tailing {build_path}: Jenkins sent no {TEXT_SIZE_HEADER} header");
                return Ok(());
            };

            debug!("Console of {build_path}: offset {offset} -> {next_offset}");
            offset = next_offset;

            tokio::select! {
                () = tokio::time::sleep(poll_interval) => {}
                () = cancel.cancelled() => {}
            }
        }
    }
}

/// Next read offset, if reported, and whether the build is still producing output.
fn progress(headers: &HeaderMap) -> (Option<u64>, bool) {
    let next = headers
        .get(TEXT_SIZE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let more = headers
        .get(MORE_DATA_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));
    (next, more)
}
