//! GraphQL HTTP client implementation.

use std::time::Duration;

use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER, USER_AGENT,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::GraphqlClientError;
use crate::operation::{GraphqlOperation, GraphqlQuery, GraphqlRequest, GraphqlResponse};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// GraphQL client configuration.
#[derive(Debug, Clone)]
pub struct GraphqlClientConfig {
    /// Default headers applied to every request.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GraphqlClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("esologs-rs/", env!("CARGO_PKG_VERSION"))),
        );
        Self {
            headers,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// GraphQL client builder.
#[derive(Debug, Clone)]
pub struct GraphqlClientBuilder {
    endpoint: String,
    config: GraphqlClientConfig,
}

impl GraphqlClientBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            config: GraphqlClientConfig::default(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Override the `User-Agent` header.
    ///
    /// Values that are not valid header text are ignored.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl AsRef<str>) -> Self {
        if let Ok(value) = HeaderValue::from_str(user_agent.as_ref()) {
            self.config.headers.insert(USER_AGENT, value);
        }
        self
    }

    /// Set timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GraphqlClient, GraphqlClientError> {
        GraphqlClient::with_config(self.endpoint, self.config)
    }
}

/// GraphQL client.
///
/// The client holds no credentials; each call receives the bearer token to
/// send, so one client can serve app-level and user-level tokens alike.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
}

impl GraphqlClient {
    /// Create a builder for `endpoint`.
    #[must_use]
    pub fn builder(endpoint: impl Into<String>) -> GraphqlClientBuilder {
        GraphqlClientBuilder::new(endpoint)
    }

    /// Create a client with custom configuration.
    pub fn with_config(
        endpoint: impl Into<String>,
        config: GraphqlClientConfig,
    ) -> Result<Self, GraphqlClientError> {
        let http = reqwest::Client::builder()
            .default_headers(config.headers)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a typed operation and return the full response.
    pub async fn execute<O: GraphqlOperation>(
        &self,
        bearer_token: &str,
        variables: O::Variables,
    ) -> Result<GraphqlResponse<O::ResponseData>, GraphqlClientError> {
        self.execute_request(bearer_token, GraphqlRequest::for_operation::<O>(variables))
            .await
    }

    /// Execute a typed operation and return data only (error on GraphQL errors).
    pub async fn execute_strict<O: GraphqlOperation>(
        &self,
        bearer_token: &str,
        variables: O::Variables,
    ) -> Result<O::ResponseData, GraphqlClientError> {
        self.execute::<O>(bearer_token, variables).await?.into_data()
    }

    /// Execute an ad-hoc query with untyped variables and response.
    pub async fn execute_raw(
        &self,
        bearer_token: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<GraphqlResponse<serde_json::Value>, GraphqlClientError> {
        self.execute_request(bearer_token, GraphqlRequest::new(GraphqlQuery::new(query), variables))
            .await
    }

    /// Execute an arbitrary request.
    #[instrument(
        skip(self, bearer_token, request),
        fields(endpoint = %self.endpoint, operation = request.operation_name.as_deref().unwrap_or("anonymous"))
    )]
    pub async fn execute_request<V, R>(
        &self,
        bearer_token: &str,
        request: GraphqlRequest<V>,
    ) -> Result<GraphqlResponse<R>, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(&request)?;
        let bytes = self.send(bearer_token, body).await?;
        let response: GraphqlResponse<R> = serde_json::from_slice(&bytes)?;

        if response.errors.is_empty() {
            debug!("GraphQL request succeeded");
        } else {
            debug!(errors = response.errors.len(), "GraphQL response carried errors");
        }
        Ok(response)
    }

    async fn send(&self, bearer_token: &str, body: Vec<u8>) -> Result<Vec<u8>, GraphqlClientError> {
        let authorization = HeaderValue::from_str(&format!("Bearer {bearer_token}"))
            .map_err(|_| GraphqlClientError::Protocol {
                message: "bearer token is not valid header text".to_string(),
            })?;

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = truncate_body(&bytes);
            warn!(status = status.as_u16(), "GraphQL endpoint returned error status");
            return Err(GraphqlClientError::HttpStatus {
                status,
                body,
                retry_after,
            });
        }

        Ok(bytes.to_vec())
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get(RETRY_AFTER)?;
    let value = header.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn truncate_body(bytes: &[u8]) -> String {
    const MAX_LEN: usize = 4096;
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if body.len() > MAX_LEN {
        let mut cut = MAX_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
