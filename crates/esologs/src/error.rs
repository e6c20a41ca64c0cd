//! Client error taxonomy.

use std::fmt;
use std::time::Duration;

use esologs_graphql::GraphqlClientError;
use esologs_oauth::OAuthError;
use thiserror::Error;

use crate::params::ValidationError;

/// Coarse error category, for callers that branch on the kind of failure
/// rather than its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed credentials, redirect URI or settings.
    Configuration,
    /// Token acquisition or refresh failed, or the API rejected the token.
    Authentication,
    /// A call argument was rejected before sending.
    Validation,
    /// Network failure, timeout, rate limiting or a server-side error.
    Transport,
    /// The API answered with GraphQL errors or an unusable payload.
    Api,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::Api => "api",
        })
    }
}

/// ESO Logs client errors.
#[derive(Error, Debug)]
pub enum EsoLogsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential flow failed
    #[error("Authentication failed: {0}")]
    Auth(#[from] OAuthError),

    /// API rejected the access token
    #[error("API rejected the access token ({status}): {body}")]
    Unauthorized {
        /// HTTP status (401 or 403).
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Invalid call argument; nothing was sent
    #[error("Invalid argument: {0}")]
    Validation(#[from] ValidationError),

    /// Network or server-side failure
    #[error("Transport error: {0}")]
    Transport(#[source] GraphqlClientError),

    /// GraphQL-level failure
    #[error("API error: {0}")]
    Api(#[source] GraphqlClientError),
}

impl EsoLogsError {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Auth(err) if err.is_config() => ErrorKind::Configuration,
            Self::Auth(_) | Self::Unauthorized { .. } => ErrorKind::Authentication,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Api(_) => ErrorKind::Api,
        }
    }

    /// Check if the same call may succeed if repeated later.
    ///
    /// The client itself never repeats a call.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Auth(err) => err.is_transport(),
            Self::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Get the server-suggested retry delay.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Transport(GraphqlClientError::HttpStatus { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }

    /// Returns `true` when the user must run the authorization flow again.
    #[must_use]
    pub const fn requires_reauthorization(&self) -> bool {
        match self {
            Self::Auth(err) => err.requires_reauthorization(),
            _ => false,
        }
    }
}

impl From<GraphqlClientError> for EsoLogsError {
    fn from(err: GraphqlClientError) -> Self {
        match err {
            GraphqlClientError::HttpStatus { status, body, .. }
                if status.as_u16() == 401 || status.as_u16() == 403 =>
            {
                Self::Unauthorized {
                    status: status.as_u16(),
                    body,
                }
            }
            err @ GraphqlClientError::Http(_) => Self::Transport(err),
            err if err.is_retryable() => Self::Transport(err),
            err => Self::Api(err),
        }
    }
}

/// Result type for client operations.
pub type EsoLogsResult<T> = Result<T, EsoLogsError>;
