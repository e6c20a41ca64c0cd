//! OAuth 2.0 credential flows.
//!
//! Supports the client credentials grant (app-level access), the
//! authorization code grant with optional PKCE (user-level access), and the
//! refresh token grant.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    CallbackListener, ClientAuthMethod, GrantType, OAuthError, OAuthResult, Pkce,
    ProviderEndpoints, Token, TokenResponse, pkce::PKCE_METHOD,
};

/// Default HTTP timeout for token endpoint calls.
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth 2.0 configuration.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// Client ID.
    pub client_id: String,
    /// Client secret (optional for public PKCE clients).
    pub client_secret: Option<String>,
    /// Provider endpoints.
    pub endpoints: ProviderEndpoints,
    /// Redirect URI for the authorization code flow.
    pub redirect_uri: Option<String>,
    /// Scopes requested on every user authorization.
    pub default_scopes: Vec<String>,
    /// Whether to attach a PKCE challenge to user authorization.
    pub use_pkce: bool,
    /// How the client authenticates at the token endpoint.
    pub client_auth: ClientAuthMethod,
    /// HTTP client timeout.
    pub timeout: Duration,
}

impl OAuth2Config {
    /// Create a configuration for a confidential client.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        endpoints: ProviderEndpoints,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            endpoints,
            redirect_uri: None,
            default_scopes: Vec::new(),
            use_pkce: false,
            client_auth: ClientAuthMethod::BasicHeader,
            timeout: DEFAULT_TOKEN_TIMEOUT,
        }
    }

    /// Create configuration for a public client (no secret, PKCE required).
    #[must_use]
    pub fn public_client(client_id: impl Into<String>, endpoints: ProviderEndpoints) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            endpoints,
            redirect_uri: None,
            default_scopes: Vec::new(),
            use_pkce: true,
            client_auth: ClientAuthMethod::RequestBody,
            timeout: DEFAULT_TOKEN_TIMEOUT,
        }
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set default scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.default_scopes = scopes;
        self
    }

    /// Enable or disable PKCE.
    #[must_use]
    pub const fn with_pkce(mut self, enabled: bool) -> Self {
        self.use_pkce = enabled;
        self
    }

    /// Set the client authentication method.
    #[must_use]
    pub const fn with_client_auth(mut self, method: ClientAuthMethod) -> Self {
        self.client_auth = method;
        self
    }

    /// Set timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Validate a redirect URI: absolute `http`/`https` with a host and no fragment.
pub fn validate_redirect_uri(uri: &str) -> OAuthResult<Url> {
    let parsed = Url::parse(uri)
        .map_err(|e| OAuthError::InvalidConfig(format!("redirect_uri {uri:?} is malformed: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(OAuthError::InvalidConfig(format!(
            "redirect_uri {uri:?} must use http or https"
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(OAuthError::InvalidConfig(format!(
            "redirect_uri {uri:?} has no host"
        )));
    }
    if parsed.fragment().is_some() {
        return Err(OAuthError::InvalidConfig(format!(
            "redirect_uri {uri:?} must not contain a fragment"
        )));
    }
    Ok(parsed)
}

/// A pending user authorization: the URL to open and the values needed to
/// complete the exchange once the provider redirects back.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    url: String,
    state: String,
    redirect_uri: String,
    pkce: Option<Pkce>,
}

impl AuthorizationRequest {
    /// URL the user must open in a browser.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// CSRF state expected back on the callback.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Redirect URI the provider will call back.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// PKCE pair, when the flow uses one.
    #[must_use]
    pub const fn pkce(&self) -> Option<&Pkce> {
        self.pkce.as_ref()
    }

    /// Bind a local listener for the browser redirect.
    pub async fn callback_listener(&self) -> OAuthResult<CallbackListener> {
        CallbackListener::bind(&self.redirect_uri).await
    }
}

/// OAuth 2.0 client for the ESO Logs token endpoint.
#[derive(Debug, Clone)]
pub struct OAuth2Client {
    config: OAuth2Config,
    http_client: Client,
}

impl OAuth2Client {
    /// Create a new OAuth 2.0 client.
    pub fn new(config: OAuth2Config) -> OAuthResult<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create with a custom HTTP client.
    #[must_use]
    pub const fn with_http_client(config: OAuth2Config, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Obtain an app-level token with the client credentials grant.
    #[instrument(skip(self), fields(client_id = %self.config.client_id))]
    pub async fn acquire_app_token(&self) -> OAuthResult<Token> {
        if self.config.client_secret.is_none() {
            return Err(OAuthError::InvalidConfig(
                "Client secret required for client credentials flow".into(),
            ));
        }

        let params = vec![(
            "grant_type",
            GrantType::ClientCredentials.to_string(),
        )];
        let response = self.token_request(GrantType::ClientCredentials, params).await?;
        Token::from_response(response.body, response.sent_at)
    }

    /// Start the authorization code flow.
    ///
    /// Returns the authorization URL together with the CSRF state and PKCE
    /// verifier needed by [`OAuth2Client::complete_user_authorization`].
    pub fn begin_user_authorization(&self, scopes: &[&str]) -> OAuthResult<AuthorizationRequest> {
        let redirect_uri = self.config.redirect_uri.as_deref().ok_or_else(|| {
            OAuthError::InvalidConfig("redirect_uri required for user authorization".into())
        })?;
        validate_redirect_uri(redirect_uri)?;

        let state = generate_state();
        let pkce = self.config.use_pkce.then(Pkce::generate);

        let mut url = Url::parse(&self.config.endpoints.authorization_url)?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("response_type", "code");
            params.append_pair("client_id", &self.config.client_id);
            params.append_pair("redirect_uri", redirect_uri);
            params.append_pair("state", &state);

            // Combine default scopes with requested scopes
            let all_scopes: Vec<&str> = self
                .config
                .default_scopes
                .iter()
                .map(String::as_str)
                .chain(scopes.iter().copied())
                .collect();
            if !all_scopes.is_empty() {
                params.append_pair("scope", &all_scopes.join(" "));
            }

            if let Some(pkce) = &pkce {
                params.append_pair("code_challenge", pkce.challenge());
                params.append_pair("code_challenge_method", PKCE_METHOD);
            }
        }

        debug!(redirect_uri, pkce = pkce.is_some(), "built authorization URL");
        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
            redirect_uri: redirect_uri.to_string(),
            pkce,
        })
    }

    /// Exchange the one-time authorization code for an access + refresh token pair.
    #[instrument(skip(self, request, code), fields(client_id = %self.config.client_id))]
    pub async fn complete_user_authorization(
        &self,
        request: &AuthorizationRequest,
        code: &str,
    ) -> OAuthResult<Token> {
        if code.is_empty() {
            return Err(OAuthError::InvalidTokenResponse(
                "Missing authorization code".into(),
            ));
        }

        let mut params = vec![
            ("grant_type", GrantType::AuthorizationCode.to_string()),
            ("code", code.to_string()),
            ("redirect_uri", request.redirect_uri.clone()),
        ];
        if let Some(pkce) = &request.pkce {
            params.push(("code_verifier", pkce.verifier().to_string()));
        }

        let response = self.token_request(GrantType::AuthorizationCode, params).await?;
        Token::from_response(response.body, response.sent_at)
    }

    /// Exchange the token's refresh token for a new token.
    ///
    /// The input token is left untouched; on failure the caller keeps using
    /// (or discards) it and must restart user authorization.
    #[instrument(skip(self, token), fields(client_id = %self.config.client_id))]
    pub async fn refresh(&self, token: &Token) -> OAuthResult<Token> {
        let refresh_token = token.refresh_token().ok_or(OAuthError::NoRefreshToken)?;

        let params = vec![
            ("grant_type", GrantType::RefreshToken.to_string()),
            ("refresh_token", refresh_token.to_string()),
        ];
        let response = self.token_request(GrantType::RefreshToken, params).await?;
        Token::from_refresh_response(response.body, token, response.sent_at)
    }

    /// Make a token request.
    async fn token_request(
        &self,
        grant: GrantType,
        mut params: Vec<(&'static str, String)>,
    ) -> OAuthResult<TimedTokenResponse> {
        let mut request = self.http_client.post(&self.config.endpoints.token_url);

        match (self.config.client_auth, &self.config.client_secret) {
            (ClientAuthMethod::BasicHeader, Some(secret)) => {
                request = request.basic_auth(&self.config.client_id, Some(secret));
            }
            (_, secret) => {
                params.push(("client_id", self.config.client_id.clone()));
                if let Some(secret) = secret {
                    params.push(("client_secret", secret.clone()));
                }
            }
        }

        let sent_at = Utc::now();
        let response = request.form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let error: TokenErrorResponse =
                response.json().await.unwrap_or_else(|_| TokenErrorResponse {
                    error: "unknown_error".to_string(),
                    error_description: None,
                });
            let message = match error.error_description {
                Some(description) => format!("{}: {description}", error.error),
                None => error.error,
            };
            warn!(%grant, status = status.as_u16(), %message, "token endpoint rejected request");

            return Err(match grant {
                GrantType::RefreshToken => OAuthError::RefreshFailed {
                    status: status.as_u16(),
                    message,
                },
                _ => OAuthError::TokenExchangeFailed {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::InvalidTokenResponse(e.to_string()))?;
        debug!(%grant, expires_in = ?body.expires_in, "token endpoint issued token");
        Ok(TimedTokenResponse { body, sent_at })
    }
}

struct TimedTokenResponse {
    body: TokenResponse,
    sent_at: chrono::DateTime<Utc>,
}

/// OAuth 2.0 error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Authorization callback parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationCallback {
    /// Authorization code.
    pub code: Option<String>,
    /// State parameter.
    pub state: Option<String>,
    /// Error code.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
    /// Error URI.
    pub error_uri: Option<String>,
}

impl AuthorizationCallback {
    /// Parse callback from query string.
    pub fn from_query(query: &str) -> OAuthResult<Self> {
        serde_urlencoded::from_str(query)
            .map_err(|e| OAuthError::InvalidTokenResponse(e.to_string()))
    }

    /// Parse callback from URL.
    pub fn from_url(url: &str) -> OAuthResult<Self> {
        let parsed = Url::parse(url)?;
        let query = parsed.query().unwrap_or("");
        Self::from_query(query)
    }

    /// Validate the callback and extract the code.
    pub fn validate(&self, expected_state: &str) -> OAuthResult<String> {
        // Check for errors first
        if let Some(error) = &self.error {
            return Err(OAuthError::AuthorizationError {
                error: error.clone(),
                description: self.error_description.clone().unwrap_or_default(),
                error_uri: self.error_uri.clone(),
            });
        }

        let state = self
            .state
            .as_ref()
            .ok_or_else(|| OAuthError::InvalidTokenResponse("Missing state parameter".into()))?;

        if state != expected_state {
            return Err(OAuthError::StateMismatch {
                expected: expected_state.to_string(),
                actual: state.clone(),
            });
        }

        self.code
            .clone()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| OAuthError::InvalidTokenResponse("Missing authorization code".into()))
    }
}

/// Generate a cryptographically random state parameter.
fn generate_state() -> String {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OAuth2Config {
        OAuth2Config::new("test_client_id", "test_client_secret", ProviderEndpoints::esologs())
            .with_redirect_uri("http://localhost:8765/callback")
    }

    #[test]
    fn test_authorization_url() {
        let client = OAuth2Client::new(test_config()).unwrap();

        let request = client
            .begin_user_authorization(&["view-user-profile"])
            .unwrap();
        let url = request.url();

        assert!(url.starts_with("https://www.esologs.com/oauth/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains(&format!("state={}", request.state())));
        assert!(url.contains("scope=view-user-profile"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8765%2Fcallback"));
        assert!(!url.contains("code_challenge"));
        assert!(request.pkce().is_none());
    }

    #[test]
    fn test_authorization_url_with_pkce() {
        let client = OAuth2Client::new(test_config().with_pkce(true)).unwrap();

        let request = client.begin_user_authorization(&[]).unwrap();
        let pkce = request.pkce().expect("pkce");

        assert!(request.url().contains(&format!("code_challenge={}", pkce.challenge())));
        assert!(request.url().contains("code_challenge_method=S256"));
    }

    #[test]
    fn test_state_is_unique_per_request() {
        let client = OAuth2Client::new(test_config()).unwrap();
        let first = client.begin_user_authorization(&[]).unwrap();
        let second = client.begin_user_authorization(&[]).unwrap();
        assert_ne!(first.state(), second.state());
    }

    #[test]
    fn test_missing_redirect_uri_is_config_error() {
        let config = OAuth2Config::new("id", "secret", ProviderEndpoints::esologs());
        let client = OAuth2Client::new(config).unwrap();

        let err = client.begin_user_authorization(&[]).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_redirect_uris() {
        for uri in [
            "not a url",
            "localhost:8765/callback",
            "ftp://localhost/callback",
            "http://",
            "http://localhost:8765/callback#frag",
        ] {
            let err = validate_redirect_uri(uri).unwrap_err();
            assert!(err.is_config(), "{uri} should be rejected");
        }
        assert!(validate_redirect_uri("http://127.0.0.1:8765/callback").is_ok());
        assert!(validate_redirect_uri("https://example.com/oauth/done").is_ok());
    }

    #[test]
    fn test_callback_validation() {
        let callback =
            AuthorizationCallback::from_query("code=auth_code_123&state=expected_state").unwrap();

        let code = callback.validate("expected_state").unwrap();
        assert_eq!(code, "auth_code_123");
    }

    #[test]
    fn test_callback_state_mismatch() {
        let callback = AuthorizationCallback {
            code: Some("auth_code_123".to_string()),
            state: Some("wrong_state".to_string()),
            ..AuthorizationCallback::default()
        };

        let result = callback.validate("expected_state");
        assert!(matches!(result, Err(OAuthError::StateMismatch { .. })));
    }

    #[test]
    fn test_callback_error() {
        let callback = AuthorizationCallback::from_url(
            "http://localhost:8765/callback?error=access_denied&error_description=User+denied+access&state=s",
        )
        .unwrap();

        let result = callback.validate("s");
        match result {
            Err(OAuthError::AuthorizationError { error, description, .. }) => {
                assert_eq!(error, "access_denied");
                assert_eq!(description, "User denied access");
            }
            other => panic!("expected authorization error, got {other:?}"),
        }
    }

    #[test]
    fn test_public_client_config() {
        let config = OAuth2Config::public_client("public_client", ProviderEndpoints::esologs());

        assert!(config.client_secret.is_none());
        assert!(config.use_pkce);
        assert_eq!(config.client_auth, ClientAuthMethod::RequestBody);
    }

    #[tokio::test]
    async fn test_client_credentials_requires_secret() {
        let client = OAuth2Client::new(OAuth2Config::public_client(
            "public_client",
            ProviderEndpoints::esologs(),
        ))
        .unwrap();

        let err = client.acquire_app_token().await.unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let client = OAuth2Client::new(test_config()).unwrap();
        let token = Token::new("a", "Bearer", Utc::now());

        let err = client.refresh(&token).await.unwrap_err();
        assert!(matches!(err, OAuthError::NoRefreshToken));
    }
}
