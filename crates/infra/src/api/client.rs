//! Resilient API client
//!
//! One logical HTTP request per call: bearer token injection, per-attempt
//! timeout, retry with linear backoff on server and transport failures, and a
//! single error taxonomy for everything that can go wrong. Successful bodies
//! are returned as parsed JSON without interpretation.

use std::sync::Arc;
use std::time::Duration;

use civic_core::AccessTokenProvider;
use civic_domain::constants::{HEALTH_CHECK_TIMEOUT_MS, IDEMPOTENCY_KEY_HEADER};
use civic_domain::{ClientConfig, Envelope};
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::errors::ApiError;
use crate::http::{Delivered, HttpClient};

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL including the `/api` prefix, without trailing slash
    pub base_url: String,
    /// Deadline for each attempt
    pub timeout: Duration,
    /// Total attempts for retryable failures (initial try included)
    pub retry_attempts: u32,
    /// Backoff unit; retry `n` waits `n × retry_backoff`
    pub retry_backoff: Duration,
    pub user_agent: String,
}

impl From<&ClientConfig> for ApiClientConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            retry_attempts: config.retry_attempts,
            retry_backoff: config.retry_backoff(),
            user_agent: format!("{}/{}", config.service_name, env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// API client with resilience patterns
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is empty or the HTTP client
    /// cannot be created.
    pub fn new(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("base URL must not be empty".into()));
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.retry_attempts)
            .backoff_unit(config.retry_backoff)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self { http, auth, config })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Perform one logical request and return the parsed JSON body
    ///
    /// `endpoint` is appended to the base URL and may carry a query string.
    /// Non-GET requests get a fresh `Idempotency-Key` that every retry of
    /// this call repeats.
    ///
    /// # Errors
    /// - `Timeout` / `NetworkUnavailable` once all attempts are used up
    /// - `Server` for a 5xx after the last attempt (504 reports `Timeout`)
    /// - `Client` for any 4xx, carrying the server's message when present
    /// - `MalformedResponse` when a success body is not JSON
    #[instrument(skip(self, body), fields(method = %method, endpoint = %endpoint))]
    pub async fn request(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        require_auth: bool,
    ) -> Result<Value, ApiError> {
        let mut builder = self.prepare(endpoint, method, require_auth).await;
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let delivered = self.http.send(builder).await?;
        let attempts = delivered.attempts;
        let value = read_json(delivered).await?;
        debug!(attempts, "request completed");
        Ok(value)
    }

    /// [`ApiClient::request`] followed by decoding the `{success, data, message}`
    /// envelope against `T`
    ///
    /// # Errors
    /// As [`ApiClient::request`]; a body that does not match the schema is
    /// `MalformedResponse`.
    pub async fn request_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
        require_auth: bool,
    ) -> Result<Envelope<T>, ApiError> {
        let value = self.request(endpoint, method, body, require_auth).await?;
        decode_envelope(value)
    }

    /// Multipart submission, attempted exactly once
    ///
    /// # Errors
    /// Same classification as [`ApiClient::request`] with a single attempt.
    #[instrument(skip(self, form), fields(endpoint = %endpoint))]
    pub async fn upload<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
        require_auth: bool,
    ) -> Result<Envelope<T>, ApiError> {
        let builder = self.prepare(endpoint, Method::POST, require_auth).await.multipart(form);
        let delivered = self.http.send_once(builder).await?;
        let value = read_json(delivered).await?;
        info!("multipart upload completed");
        decode_envelope(value)
    }

    /// Liveness probe against `GET /health`, no auth
    ///
    /// # Errors
    /// Returns transport errors; a non-2xx answer is `Ok(false)`.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let timeout = Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS);
        let builder = self.prepare("/health", Method::GET, false).await.timeout(timeout);

        match self.http.send(builder).await {
            Ok(delivered) if delivered.response.status().is_success() => {
                info!("API is healthy");
                Ok(true)
            }
            Ok(delivered) => {
                warn!(status = %delivered.response.status(), "API returned non-success status");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Health check failed");
                Err(e.into())
            }
        }
    }

    async fn prepare(&self, endpoint: &str, method: Method, require_auth: bool) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let idempotent = method == Method::GET;
        let mut builder = self.http.request(method, url).header(ACCEPT, "application/json");

        if require_auth {
            match self.auth.access_token().await {
                Some(token) => builder = builder.bearer_auth(token),
                None => debug!("no access token available; sending unauthenticated"),
            }
        }

        if !idempotent {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, Uuid::new_v4().to_string());
        }

        builder
    }
}

async fn read_json(delivered: Delivered) -> Result<Value, ApiError> {
    let Delivered { response, attempts } = delivered;
    let status = response.status();
    let body = response.bytes().await.map_err(|e| ApiError::NetworkUnavailable {
        message: format!("failed to read response body: {e}"),
        attempts,
    })?;

    if !status.is_success() {
        return Err(map_status_error(status, &body, attempts));
    }

    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT || body.is_empty()
    {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&body)
        .map_err(|e| ApiError::MalformedResponse(format!("response body is not valid JSON: {e}")))
}

fn map_status_error(status: StatusCode, body: &[u8], attempts: u32) -> ApiError {
    let code = status.as_u16();
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_owned))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("Request failed with status {code}"));

    if status == StatusCode::GATEWAY_TIMEOUT {
        ApiError::Timeout { attempts }
    } else if status.is_server_error() {
        ApiError::Server { status: code, message, attempts }
    } else if status.is_client_error() {
        ApiError::Client { status: code, message }
    } else {
        ApiError::MalformedResponse(format!("unexpected status {code}"))
    }
}

fn decode_envelope<T: DeserializeOwned>(value: Value) -> Result<Envelope<T>, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedResponse(format!("response envelope mismatch: {e}")))
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the access token source
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    /// Returns error if the token source is missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let auth =
            self.auth.ok_or_else(|| ApiError::Config("Auth provider not set".to_string()))?;

        ApiClient::new(config, auth)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct StaticToken(Option<String>);

    #[async_trait]
    impl AccessTokenProvider for StaticToken {
        async fn access_token(&self) -> Option<String> {
            self.0.clone()
        }
    }

    fn client_for(server: &MockServer, attempts: u32, token: Option<&str>) -> ApiClient {
        let config = ApiClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
            retry_attempts: attempts,
            retry_backoff: Duration::from_millis(5),
            ..Default::default()
        };
        ApiClient::new(config, Arc::new(StaticToken(token.map(str::to_string)))).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, None);
        assert!(client.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, None);
        assert!(!client.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_builder_missing_auth() {
        assert!(matches!(ApiClient::builder().build(), Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn attaches_bearer_token_when_required() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, Some("tok-1"));
        let value = client.request("/auth/me", Method::GET, None, true).await.unwrap();
        assert_eq!(value["success"], json!(true));
    }

    #[tokio::test]
    async fn omits_authorization_without_token_or_when_not_required() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&mock_server)
            .await;

        client_for(&mock_server, 1, None).request("/issues", Method::GET, None, true).await.unwrap();
        client_for(&mock_server, 1, Some("tok-1"))
            .request("/health", Method::GET, None, false)
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.headers.get("Authorization").is_none()));
    }

    #[tokio::test]
    async fn client_error_surfaces_server_message_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/issues"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({"success": false, "message": "Title is required"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 3, Some("tok-1"));
        let err = client
            .request("/issues", Method::POST, Some(&json!({"title": ""})), true)
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::Client { status: 422, message: "Title is required".into() });
    }

    #[tokio::test]
    async fn client_error_without_body_gets_generic_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 2, Some("tok-1"));
        let err = client.request("/issues/i1", Method::DELETE, None, true).await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Client { status: 404, message: "Request failed with status 404".into() }
        );
    }

    #[tokio::test]
    async fn idempotency_key_is_stable_across_retries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 3, Some("tok-1"));
        let err = client.request("/issues/i1/upvote", Method::POST, None, true).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 503, attempts: 3, .. }));

        let requests = mock_server.received_requests().await.unwrap();
        let keys: Vec<_> = requests
            .iter()
            .map(|r| r.headers.get(IDEMPOTENCY_KEY_HEADER).cloned().expect("idempotency key"))
            .collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn get_requests_carry_no_idempotency_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, None);
        client.request("/issues", Method::GET, None, true).await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests[0].headers.get(IDEMPOTENCY_KEY_HEADER).is_none());
    }

    #[tokio::test]
    async fn gateway_timeout_is_reported_as_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(504))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 2, None);
        let err = client.request("/issues", Method::GET, None, true).await.unwrap_err();

        assert_eq!(err, ApiError::Timeout { attempts: 2 });
    }

    #[tokio::test]
    async fn non_json_success_body_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, None);
        let err = client.request("/issues", Method::GET, None, true).await.unwrap_err();

        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn no_content_is_null() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, Some("tok-1"));
        let value = client.request("/auth/logout", Method::POST, None, true).await.unwrap();

        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn envelope_schema_mismatch_is_malformed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 1, None);
        let result: Result<Envelope<Value>, _> =
            client.request_envelope("/issues", Method::GET, None, true).await;

        assert!(matches!(result, Err(ApiError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn upload_is_attempted_once() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/issues"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, 3, Some("tok-1"));
        let form = Form::new().text("title", "Pothole");
        let result: Result<Envelope<Value>, _> = client.upload("/issues", form, true).await;

        assert!(matches!(result, Err(ApiError::Server { status: 500, attempts: 1, .. })));
    }
}
