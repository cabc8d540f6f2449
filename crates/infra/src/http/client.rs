use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use thiserror::Error;
use tracing::{debug, warn};

/// A response that made it back from the server, with the number of attempts
/// it took.
#[derive(Debug)]
pub struct Delivered {
    pub response: Response,
    pub attempts: u32,
}

/// Failure to get any response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out after {attempts} attempt(s)")]
    Timeout { attempts: u32 },

    #[error("network error after {attempts} attempt(s): {message}")]
    Network { message: String, attempts: u32 },

    #[error("invalid request: {0}")]
    Request(String),
}

/// HTTP client with built-in retry and timeout support.
///
/// Server errors (5xx), timeouts and connection failures are retried until
/// `max_attempts` is reached. The wait before retry `n` is `n × backoff_unit`.
/// The last 5xx response is handed back as-is so the caller can classify it.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: u32,
    backoff_unit: Duration,
    attempt_timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// The body must be cloneable (JSON or empty); streaming bodies belong in
    /// [`HttpClient::send_once`].
    ///
    /// # Errors
    /// Returns [`TransportError`] when no response arrived within the allowed
    /// attempts or the request could not be built.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Delivered, TransportError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    TransportError::Request(
                        "request body cannot be cloned; use send_once for streaming bodies".into(),
                    )
                })?
                .build()
                .map_err(|err| TransportError::Request(err.to_string()))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, max_attempts = attempts, %method, %url, "sending HTTP request");

            match tokio::time::timeout(self.attempt_timeout, self.client.execute(request)).await {
                Ok(Ok(response)) => {
                    let status = response.status();
                    debug!(attempt, %method, %url, %status, "received HTTP response");

                    if !(status.is_server_error() && attempt < attempts) {
                        return Ok(Delivered { response, attempts: attempt });
                    }
                    warn!(attempt, %method, %url, %status, "server error; retrying");
                }
                Ok(Err(err)) => {
                    debug!(attempt, %method, %url, error = %err, "HTTP request failed");

                    if attempt >= attempts || !should_retry_error(&err) {
                        return Err(classify(&err, attempt));
                    }
                    warn!(attempt, %method, %url, error = %err, "transport failure; retrying");
                }
                Err(_) => {
                    debug!(attempt, %method, %url, timeout = ?self.attempt_timeout, "HTTP request timed out");

                    if attempt >= attempts {
                        return Err(TransportError::Timeout { attempts: attempt });
                    }
                    warn!(attempt, %method, %url, "request timed out; retrying");
                }
            }

            self.sleep_before_retry(attempt).await;
        }
    }

    /// Execute the request exactly once, without retry.
    ///
    /// # Errors
    /// Same classification as [`HttpClient::send`] with `attempts == 1`.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Delivered, TransportError> {
        let request = builder.build().map_err(|err| TransportError::Request(err.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending single-attempt HTTP request");

        match tokio::time::timeout(self.attempt_timeout, self.client.execute(request)).await {
            Ok(Ok(response)) => Ok(Delivered { response, attempts: 1 }),
            Ok(Err(err)) => Err(classify(&err, 1)),
            Err(_) => Err(TransportError::Timeout { attempts: 1 }),
        }
    }

    fn backoff_delay(&self, retry_number: u32) -> Duration {
        self.backoff_unit.saturating_mul(retry_number)
    }

    async fn sleep_before_retry(&self, retry_number: u32) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    backoff_unit: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_attempts: 1,
            backoff_unit: Duration::from_millis(civic_domain::constants::DEFAULT_RETRY_BACKOFF_MS),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Deadline for each individual attempt.
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub const fn backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// # Errors
    /// Returns [`TransportError::Request`] if the TLS backend cannot be
    /// initialised.
    pub fn build(self) -> Result<HttpClient, TransportError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| TransportError::Request(err.to_string()))?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            backoff_unit: self.backoff_unit,
            attempt_timeout: self.timeout,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}

fn classify(err: &reqwest::Error, attempts: u32) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout { attempts }
    } else if err.is_builder() {
        TransportError::Request(err.to_string())
    } else {
        TransportError::Network { message: err.to_string(), attempts }
    }
}
