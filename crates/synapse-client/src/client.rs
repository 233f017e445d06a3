//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::api::{AuthApi, AxonApi, CortexApi, HealthApi, StormApi, VarsApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for streaming requests.
const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Header carrying the Cortex API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Synapse Cortex API client.
///
/// Provides typed access to the Cortex REST endpoints under `/api/v1`.
///
/// # Example
///
/// ```no_run
/// use synapse_client::SynapseClient;
///
/// # async fn example() -> synapse_client::Result<()> {
/// let client = SynapseClient::builder()
///     .host_port("cortex.local", "4443")
///     .api_key("secret")
///     .build()?;
///
/// let results = client.storm().query("inet:fqdn=vertex.link", None).await?;
/// println!("{} nodes", results.nodes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SynapseClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: reqwest::Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
    /// Request timeout.
    pub(crate) timeout: Duration,
    /// Streaming timeout.
    pub(crate) stream_timeout: Duration,
}

/// Cortex JSON response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    code: String,
    #[serde(default)]
    mesg: String,
}

impl SynapseClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API (login, users, roles).
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the Storm API.
    pub fn storm(&self) -> StormApi {
        StormApi::new(self.clone())
    }

    /// Access the Cortex API (status, model, feed).
    pub fn cortex(&self) -> CortexApi {
        CortexApi::new(self.clone())
    }

    /// Access the vars API.
    pub fn vars(&self) -> VarsApi {
        VarsApi::new(self.clone())
    }

    /// Access the Axon blob API.
    pub fn axon(&self) -> AxonApi {
        AxonApi::new(self.clone())
    }

    /// Access the health checks.
    pub fn health(&self) -> HealthApi {
        HealthApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/v1/{}", path))
            .map_err(Error::from)
    }

    /// Make a GET request and unwrap the `result` of the response envelope.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a GET request and return the JSON body as-is.
    pub(crate) async fn get_value(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Make a GET request and return the raw body.
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.stream_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request with a raw (non-JSON) body.
    pub(crate) async fn post_bytes<T>(&self, path: &str, body: Vec<u8>) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, bytes = body.len(), "POST");
        let response = self
            .inner
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .timeout(self.inner.stream_timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a POST request for streaming (returns the response directly).
    pub(crate) async fn post_stream<B>(&self, path: &str, body: &B) -> Result<reqwest::Response>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST (stream)");
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.stream_timeout)
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "Stream response");
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(response)
    }

    /// Handle a response, unwrapping the envelope or extracting the error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        let envelope: ApiResponse = response.json().await?;
        if envelope.status == "ok" {
            Ok(serde_json::from_value(envelope.result)?)
        } else {
            Err(Error::Api {
                status,
                code: envelope.code,
                message: envelope.mesg,
            })
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        // Try to parse error response
        match response.json::<ErrorResponse>().await {
            Ok(err) => {
                if status == 404 {
                    Error::NotFound(err.mesg)
                } else if status == 401 {
                    Error::Auth(err.mesg)
                } else {
                    Error::Api {
                        status,
                        code: err.code,
                        message: err.mesg,
                    }
                }
            }
            Err(_) => Error::Api {
                status,
                code: "unknown".to_string(),
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating a SynapseClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    stream_timeout: Duration,
    user_agent: Option<String>,
    accept_invalid_certs: bool,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            user_agent: None,
            accept_invalid_certs: false,
        }
    }

    /// Set the base URL for the Cortex.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the base URL to `https://{host}:{port}`.
    pub fn host_port(self, host: &str, port: &str) -> Self {
        self.base_url(format!("https://{}:{}", host, port))
    }

    /// Set the API key sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the streaming request timeout.
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Skip TLS certificate verification (self-signed Cortex deployments).
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<SynapseClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|_| Error::Config("Invalid API key".to_string()))?;
            headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        }

        // Build HTTP client
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("synapse-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .cookie_store(true)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?;

        Ok(SynapseClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                stream_timeout: self.stream_timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_with_host_port() {
        let client = ClientBuilder::new()
            .host_port("cortex.local", "4443")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "https://cortex.local:4443/");
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_builder_rejects_bad_api_key() {
        let result = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .api_key("bad\nkey")
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_url_building() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:8080")
            .build()
            .unwrap();

        let url = client.url("storm").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/storm");

        let url = client.url("/auth/users").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/auth/users");
    }
}
