//! ESO Logs API client.

use std::fmt;
use std::sync::Arc;

use esologs_graphql::{GraphqlClient, GraphqlOperation};
use esologs_oauth::{
    AuthorizationCodeProvider, ClientCredentialsProvider, DEFAULT_CALLBACK_TIMEOUT,
    APP_TOKEN_KEY, DEFAULT_TOKEN_KEY, OAuth2Client, Token, TokenCache, TokenProvider, TokenState, TokenStore,
};
use serde_json::Value;
use tracing::{debug, info, instrument, trace};

use crate::config::ClientConfig;
use crate::error::{EsoLogsError, EsoLogsResult};
use crate::logging::{DEFAULT_REDACT_FIELDS, redact_sensitive};
use crate::params::ParamBundle;

/// Which credentials the client presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// App-level token from the client credentials grant (public data).
    App,
    /// User-level token from the authorization code flow (private data).
    User,
}

/// Builder for [`EsoLogsClient`].
#[derive(Debug)]
pub struct EsoLogsClientBuilder {
    config: ClientConfig,
    mode: AuthMode,
    user_token: Option<Token>,
    store: Option<(Arc<dyn TokenStore>, String)>,
    persist_to_token_dir: bool,
}

impl EsoLogsClientBuilder {
    /// App-mode builder for `config`.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self {
            config,
            mode: AuthMode::App,
            user_token: None,
            store: None,
            persist_to_token_dir: false,
        }
    }

    /// Use user-level access, starting from a token already persisted in the
    /// configured store.
    #[must_use]
    pub const fn user_mode(mut self) -> Self {
        self.mode = AuthMode::User;
        self
    }

    /// Use user-level access with a token from a completed code exchange.
    #[must_use]
    pub fn user_token(mut self, token: Token) -> Self {
        self.mode = AuthMode::User;
        self.user_token = Some(token);
        self
    }

    /// Persist tokens to `store` under `key`.
    #[must_use]
    pub fn token_store(mut self, store: Arc<dyn TokenStore>, key: impl Into<String>) -> Self {
        self.store = Some((store, key.into()));
        self
    }

    /// Persist tokens in [`ClientConfig::token_dir`].
    ///
    /// User sessions go under [`DEFAULT_TOKEN_KEY`], app tokens under
    /// [`APP_TOKEN_KEY`]. An explicit [`token_store`](Self::token_store)
    /// takes precedence.
    #[must_use]
    pub const fn persist_to_token_dir(mut self) -> Self {
        self.persist_to_token_dir = true;
        self
    }

    /// Build the client.
    pub fn build(self) -> EsoLogsResult<EsoLogsClient> {
        self.config.validate()?;

        let oauth = OAuth2Client::new(self.config.oauth_config())?;
        let provider: Arc<dyn TokenProvider> = match self.mode {
            AuthMode::App => Arc::new(ClientCredentialsProvider::new(oauth.clone())),
            AuthMode::User => Arc::new(AuthorizationCodeProvider::new(oauth.clone())),
        };

        let store = self.store.or_else(|| {
            self.persist_to_token_dir.then(|| {
                let key = match self.mode {
                    AuthMode::App => APP_TOKEN_KEY,
                    AuthMode::User => DEFAULT_TOKEN_KEY,
                };
                (
                    Arc::new(self.config.token_store()) as Arc<dyn TokenStore>,
                    key.to_string(),
                )
            })
        });

        let mut tokens = TokenCache::new(provider).with_skew(self.config.refresh_skew);
        if let Some((store, key)) = store {
            tokens = tokens.with_store(store, key);
        }
        match self.user_token {
            Some(token) => tokens.seed(token)?,
            None if self.mode == AuthMode::User => {
                if tokens.load_from_store()?.is_none() {
                    debug!("no persisted user token; calls will require authorization");
                }
            }
            None => {}
        }

        let endpoint = match self.mode {
            AuthMode::App => &self.config.endpoints.client_api_url,
            AuthMode::User => &self.config.endpoints.user_api_url,
        };
        let graphql = GraphqlClient::builder(endpoint.clone())
            .with_timeout(self.config.timeout)
            .with_user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| EsoLogsError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(EsoLogsClient {
            inner: Arc::new(Inner {
                config: self.config,
                mode: self.mode,
                oauth,
                graphql,
                tokens,
            }),
        })
    }
}

struct Inner {
    config: ClientConfig,
    mode: AuthMode,
    oauth: OAuth2Client,
    graphql: GraphqlClient,
    tokens: TokenCache,
}

/// Async client for the ESO Logs v2 API.
///
/// Cheap to clone; clones share one token cache, so concurrent calls renew
/// an expired token at most once.
#[derive(Clone)]
pub struct EsoLogsClient {
    inner: Arc<Inner>,
}

impl EsoLogsClient {
    /// App-mode client for `config`.
    pub fn new(config: ClientConfig) -> EsoLogsResult<Self> {
        EsoLogsClientBuilder::new(config).build()
    }

    /// App-mode client configured from the environment.
    pub fn from_env() -> EsoLogsResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Builder for `config`.
    #[must_use]
    pub const fn builder(config: ClientConfig) -> EsoLogsClientBuilder {
        EsoLogsClientBuilder::new(config)
    }

    /// Run the browser authorization flow and return a user-mode client.
    ///
    /// Binds a listener on the configured redirect URI, hands the
    /// authorization URL to `open_url`, and waits for the redirect. The
    /// resulting token is persisted to the default token file.
    #[instrument(skip(config, open_url))]
    pub async fn authorize_user<F>(
        config: ClientConfig,
        scopes: &[&str],
        open_url: F,
    ) -> EsoLogsResult<Self>
    where
        F: FnOnce(&str),
    {
        config.validate()?;
        let oauth = OAuth2Client::new(config.oauth_config())?;

        let request = oauth.begin_user_authorization(scopes)?;
        let listener = request.callback_listener().await?;
        open_url(request.url());

        let code = listener
            .wait_for_code(request.state(), DEFAULT_CALLBACK_TIMEOUT)
            .await?;
        let token = oauth.complete_user_authorization(&request, &code).await?;
        info!(expires_at = %token.expires_at(), "user authorization complete");

        Self::builder(config)
            .persist_to_token_dir()
            .user_token(token)
            .build()
    }

    /// Credentials in use.
    #[must_use]
    pub fn mode(&self) -> AuthMode {
        self.inner.mode
    }

    /// Configuration the client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Credential flow client, for callers driving authorization themselves.
    #[must_use]
    pub fn oauth(&self) -> &OAuth2Client {
        &self.inner.oauth
    }

    /// Lifecycle state of the cached token.
    #[must_use]
    pub fn token_state(&self) -> TokenState {
        self.inner.tokens.state()
    }

    /// A valid access token, renewed first if needed.
    pub async fn access_token(&self) -> EsoLogsResult<Token> {
        Ok(self.inner.tokens.token().await?)
    }

    /// Drop the cached token and its persisted copy.
    pub fn sign_out(&self) -> EsoLogsResult<()> {
        Ok(self.inner.tokens.clear()?)
    }

    /// Execute an ad-hoc query and return its `data`.
    #[instrument(skip(self, query, variables))]
    pub async fn raw_query(&self, query: &str, variables: Value) -> EsoLogsResult<Value> {
        let token = self.inner.tokens.token().await?;
        let response = self
            .inner
            .graphql
            .execute_raw(token.access_token(), query, variables)
            .await?;
        Ok(response.into_data()?)
    }

    pub(crate) fn require_user_mode(&self, operation: &str) -> EsoLogsResult<()> {
        match self.inner.mode {
            AuthMode::User => Ok(()),
            AuthMode::App => Err(EsoLogsError::Config(format!(
                "{operation} needs user authorization; build the client in user mode"
            ))),
        }
    }

    /// Execute `O` with validated variables.
    #[instrument(skip(self, variables), fields(operation = O::OPERATION_NAME))]
    pub(crate) async fn fetch<O>(&self, variables: ParamBundle) -> EsoLogsResult<O::ResponseData>
    where
        O: GraphqlOperation<Variables = ParamBundle>,
    {
        let token = self.inner.tokens.token().await?;
        trace!(
            variables = %redact_sensitive(&variables.to_value(), DEFAULT_REDACT_FIELDS),
            "sending query"
        );
        Ok(self
            .inner
            .graphql
            .execute_strict::<O>(token.access_token(), variables)
            .await?)
    }
}

impl fmt::Debug for EsoLogsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EsoLogsClient")
            .field("mode", &self.inner.mode)
            .field("endpoint", &self.inner.graphql.endpoint())
            .field("token_state", &self.inner.tokens.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use esologs_oauth::{MemoryTokenStore, ProviderEndpoints};

    fn config() -> ClientConfig {
        ClientConfig::new("id", "secret")
            .with_endpoints(ProviderEndpoints::with_base_url("http://127.0.0.1:9"))
    }

    #[test]
    fn app_mode_uses_client_endpoint() {
        let client = EsoLogsClient::new(config()).unwrap();
        assert_eq!(client.mode(), AuthMode::App);
        assert_eq!(client.token_state(), TokenState::Unissued);
        assert!(format!("{client:?}").contains("/api/v2/client"));
    }

    #[test]
    fn user_token_switches_to_user_endpoint() {
        let token = Token::new("user-access", "Bearer", Utc::now() + ChronoDuration::hours(1));
        let client = EsoLogsClient::builder(config()).user_token(token).build().unwrap();
        assert_eq!(client.mode(), AuthMode::User);
        assert_eq!(client.token_state(), TokenState::Valid);
        assert!(format!("{client:?}").contains("/api/v2/user"));
    }

    #[test]
    fn user_mode_restores_persisted_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let token = Token::new("persisted", "Bearer", Utc::now() + ChronoDuration::hours(1));
        store.save("session", &token).unwrap();

        let client = EsoLogsClient::builder(config())
            .token_store(store, "session")
            .user_mode()
            .build()
            .unwrap();
        assert_eq!(client.token_state(), TokenState::Valid);
    }

    #[tokio::test]
    async fn user_mode_without_token_requires_authorization() {
        let client = EsoLogsClient::builder(config()).user_mode().build().unwrap();
        let err = client.access_token().await.unwrap_err();
        assert!(err.requires_reauthorization());
    }

    #[test]
    fn invalid_config_fails_build() {
        let err = EsoLogsClient::new(ClientConfig::new("", "secret")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
    }
}
