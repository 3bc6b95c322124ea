use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Credentials;
use crate::error::{KickoffError, Result};
use crate::providers::jenkins::links;

const MAX_RETRIES: u32 = 5;
const RETRY_DELAY_SECONDS: u64 = 2;
const MAX_ERROR_BODY: usize = 200;

/// HTTP access to a single Jenkins instance.
pub struct JenkinsClient {
    pub(super) client: Client,
    pub base_url: Url,
    credentials: Option<Credentials>,
    max_retries: u32,
    retry_delay: Duration,
}

impl JenkinsClient {
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("kickoff/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .map_err(|e| KickoffError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: links::base_url(base_url)?,
            credentials,
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_secs(RETRY_DELAY_SECONDS),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(credentials) = &self.credentials {
            request.basic_auth(&credentials.user, Some(credentials.token.as_str()))
        } else {
            request
        }
    }

    /// GET with automatic retry on network errors, rate limits and server errors.
    ///
    /// Any other non-success status is returned as `KickoffError::Api`.
    pub(super) async fn get(&self, url: &Url) -> Result<Response> {
        let mut retry_count = 0;
        loop {
            debug!("GET {url}");
            let request = self.auth_request(self.client.get(url.clone()));

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    if retry_count >= self.max_retries {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({}), retrying in {:?} ({}/{})...",
                        e,
                        self.retry_delay,
                        retry_count + 1,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                if retry_count >= self.max_retries {
                    return Err(KickoffError::ApiErrorAfterRetries {
                        status: status.as_u16(),
                        retries: self.max_retries,
                    });
                }

                warn!(
                    "Jenkins API error (status {status}). Waiting {:?} before retry {}/{}...",
                    self.retry_delay,
                    retry_count + 1,
                    self.max_retries
                );

                tokio::time::sleep(self.retry_delay).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                return Err(api_error(response).await);
            }

            return Ok(response);
        }
    }

    pub(super) async fn get_json<T>(&self, url: &Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.get(url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Turns an unsuccessful response into `KickoffError::Api`, keeping the start of the body.
pub(super) async fn api_error(response: Response) -> KickoffError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    let message = match message.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message,
    };
    KickoffError::Api { status, message }
}

pub(super) fn is_not_found(error: &KickoffError) -> bool {
    matches!(error, KickoffError::Api { status: 404, .. })
}
