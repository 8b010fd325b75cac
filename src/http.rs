// Shared JSON-over-HTTP client used by the embedding and LLM backends

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

const EXPONENTIAL_BACKOFF_BASE: u32 = 2;
const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Blocking JSON client with retry on transport errors and 5xx responses
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    agent: ureq::Agent,
    retry_attempts: u32,
    backoff_unit: Duration,
}

impl JsonHttpClient {
    #[inline]
    pub fn new(timeout: Duration, retry_attempts: u32) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            retry_attempts: retry_attempts.max(1),
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Delay before the first retry; later retries double it
    #[inline]
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    #[inline]
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    /// POST `body` as JSON and decode the JSON response
    #[inline]
    pub fn post_json<B, R>(
        &self,
        url: &str,
        headers: &[(&str, String)],
        body: &B,
    ) -> Result<R, HttpError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request_json =
            serde_json::to_string(body).map_err(|e| HttpError::Encode(e.to_string()))?;

        let response_text = self.make_request_with_retry(url, || {
            let mut request = self
                .agent
                .post(url)
                .header("Content-Type", "application/json");
            for (name, value) in headers {
                request = request.header(*name, value.as_str());
            }
            request
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        serde_json::from_str(&response_text).map_err(|e| HttpError::Decode(e.to_string()))
    }

    /// Run [`Self::post_json`] on the blocking pool so async callers are not stalled
    #[inline]
    pub async fn post_json_async<B, R>(
        &self,
        url: String,
        headers: Vec<(&'static str, String)>,
        body: B,
    ) -> Result<R, HttpError>
    where
        B: Serialize + Send + 'static,
        R: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.post_json(&url, &headers, &body))
            .await
            .map_err(|e| HttpError::Transport(format!("request task failed: {}", e)))?
    }

    fn make_request_with_retry<F>(&self, url: &str, mut request_fn: F) -> Result<String, HttpError>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!(
                "HTTP request attempt {}/{} to {}",
                attempt, self.retry_attempts, url
            );

            match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(ureq::Error::StatusCode(status)) if status < 500 => {
                    warn!("Client error (status {}), not retrying", status);
                    return Err(HttpError::Status(status));
                }
                Err(ureq::Error::StatusCode(status)) => {
                    warn!(
                        "Server error (status {}), attempt {}/{}",
                        status, attempt, self.retry_attempts
                    );
                    last_error = Some(HttpError::Status(status));
                }
                Err(
                    error @ (ureq::Error::ConnectionFailed
                    | ureq::Error::HostNotFound
                    | ureq::Error::Timeout(_)
                    | ureq::Error::Io(_)),
                ) => {
                    warn!(
                        "Transport error: {}, attempt {}/{}",
                        error, attempt, self.retry_attempts
                    );
                    last_error = Some(HttpError::Transport(error.to_string()));
                }
                Err(error) => {
                    warn!("Non-retryable error: {}", error);
                    return Err(HttpError::Transport(error.to_string()));
                }
            }

            if attempt < self.retry_attempts {
                let delay = self.backoff_unit * EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1);
                debug!("Waiting {:?} before retry", delay);
                std::thread::sleep(delay);
            }
        }

        error!("All retry attempts failed for request to {}", url);

        Err(last_error
            .unwrap_or_else(|| HttpError::Transport("request failed after retries".to_string())))
    }
}
