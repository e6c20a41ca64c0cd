//! Client configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use esologs_oauth::{
    DEFAULT_EXPIRY_SKEW, FileTokenStore, OAuth2Config, ProviderEndpoints, validate_redirect_uri,
};
use serde::{Deserialize, Serialize};

use crate::error::{EsoLogsError, EsoLogsResult};

/// Environment variable holding the client ID.
pub const ENV_CLIENT_ID: &str = "ESOLOGS_ID";
/// Environment variable holding the client secret.
pub const ENV_CLIENT_SECRET: &str = "ESOLOGS_SECRET";
/// Environment variable holding the redirect URI (user authorization only).
pub const ENV_REDIRECT_URI: &str = "ESOLOGS_REDIRECT_URI";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ESOLOGS_TIMEOUT_SECS";

/// Configuration for [`EsoLogsClient`](crate::EsoLogsClient).
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Redirect URI registered for the user authorization flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Token, authorization and API endpoints
    #[serde(default)]
    pub endpoints: ProviderEndpoints,

    /// Request timeout, for both the token endpoint and the API
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,

    /// Tokens this close to expiry are renewed before use
    #[serde(default = "default_refresh_skew", with = "duration_secs")]
    pub refresh_skew: Duration,

    /// `User-Agent` sent with API requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Attach a PKCE challenge to user authorization
    #[serde(default = "default_use_pkce")]
    pub use_pkce: bool,

    /// Directory for the persisted user token
    #[serde(default = "default_token_dir")]
    pub token_dir: PathBuf,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_refresh_skew() -> Duration {
    DEFAULT_EXPIRY_SKEW
}

fn default_user_agent() -> String {
    concat!("esologs-rs/", env!("CARGO_PKG_VERSION")).into()
}

const fn default_use_pkce() -> bool {
    true
}

fn default_token_dir() -> PathBuf {
    PathBuf::from(".")
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl ClientConfig {
    /// Configuration with default settings for the given credentials.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            endpoints: ProviderEndpoints::default(),
            timeout: default_timeout(),
            refresh_skew: default_refresh_skew(),
            user_agent: default_user_agent(),
            use_pkce: default_use_pkce(),
            token_dir: default_token_dir(),
        }
    }

    /// Load credentials from `ESOLOGS_ID`, `ESOLOGS_SECRET` and, when set,
    /// `ESOLOGS_REDIRECT_URI` and `ESOLOGS_TIMEOUT_SECS`.
    pub fn from_env() -> EsoLogsResult<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// [`ClientConfig::from_env`] with a custom variable lookup.
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> EsoLogsResult<Self> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &str| {
            read(name).ok_or_else(|| {
                EsoLogsError::Config(format!("environment variable {name} is not set"))
            })
        };

        let mut config = Self::new(require(ENV_CLIENT_ID)?, require(ENV_CLIENT_SECRET)?);
        config.redirect_uri = read(ENV_REDIRECT_URI);
        if let Some(raw) = read(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.parse().map_err(|_| {
                EsoLogsError::Config(format!(
                    "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set the endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the expiry skew.
    #[must_use]
    pub const fn with_refresh_skew(mut self, skew: Duration) -> Self {
        self.refresh_skew = skew;
        self
    }

    /// Set the token directory.
    #[must_use]
    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = dir.into();
        self
    }

    /// Check credentials, timeout and redirect URI.
    pub fn validate(&self) -> EsoLogsResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(EsoLogsError::Config("client_id is empty".into()));
        }
        if self.client_secret.trim().is_empty() {
            return Err(EsoLogsError::Config("client_secret is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(EsoLogsError::Config("timeout must be positive".into()));
        }
        if let Some(uri) = &self.redirect_uri {
            validate_redirect_uri(uri)?;
        }
        Ok(())
    }

    /// Credential flow settings derived from this configuration.
    #[must_use]
    pub fn oauth_config(&self) -> OAuth2Config {
        let config = OAuth2Config::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.endpoints.clone(),
        )
        .with_pkce(self.use_pkce)
        .with_timeout(self.timeout);
        match &self.redirect_uri {
            Some(uri) => config.with_redirect_uri(uri.clone()),
            None => config,
        }
    }

    /// File store rooted at [`ClientConfig::token_dir`].
    #[must_use]
    pub fn token_store(&self) -> FileTokenStore {
        FileTokenStore::new(self.token_dir.clone())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("refresh_skew", &self.refresh_skew)
            .field("user_agent", &self.user_agent)
            .field("use_pkce", &self.use_pkce)
            .field("token_dir", &self.token_dir)
            .finish()
    }
}
