//! OAuth error types.

use std::time::Duration;

/// OAuth errors.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Invalid client configuration (missing secret, malformed redirect URI, ...).
    #[error("Invalid OAuth configuration: {0}")]
    InvalidConfig(String),

    /// State mismatch (potential CSRF attack).
    #[error("OAuth state mismatch: expected {expected}, got {actual}")]
    StateMismatch {
        /// Expected state value.
        expected: String,
        /// Received state value.
        actual: String,
    },

    /// Authorization error from provider.
    #[error("Authorization error: {error} - {description}")]
    AuthorizationError {
        /// Error code from provider.
        error: String,
        /// Human-readable description.
        description: String,
        /// Error URI for more information.
        error_uri: Option<String>,
    },

    /// Token exchange rejected by the provider.
    #[error("Token exchange failed ({status}): {message}")]
    TokenExchangeFailed {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Provider error code and description.
        message: String,
    },

    /// Refresh token rejected by the provider.
    #[error("Token refresh failed ({status}): {message}")]
    RefreshFailed {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Provider error code and description.
        message: String,
    },

    /// No refresh token available.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The flow cannot mint a token on its own; the user must authorize again.
    #[error("User authorization required")]
    ReauthorizationRequired,

    /// Invalid token response.
    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),

    /// HTTP request failed (unreachable endpoint, timeout, ...).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing failed.
    #[error("URL parsing failed: {0}")]
    UrlError(#[from] url::ParseError),

    /// PKCE error.
    #[error("PKCE error: {0}")]
    PkceError(String),

    /// Token store failure.
    #[error("Token store error: {0}")]
    Storage(String),

    /// Local callback listener I/O failure.
    #[error("Callback listener error: {0}")]
    Callback(#[from] std::io::Error),

    /// No authorization callback arrived in time.
    #[error("No authorization callback received within {0:?}")]
    CallbackTimeout(Duration),
}

impl OAuthError {
    /// Returns `true` for configuration problems that no retry can fix.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::UrlError(_) | Self::PkceError(_))
    }

    /// Returns `true` when the failure happened below the OAuth layer
    /// (connect errors, timeouts) and the same request may succeed later.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::HttpError(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            _ => false,
        }
    }

    /// Returns `true` when the user has to go through authorization again.
    #[must_use]
    pub const fn requires_reauthorization(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailed { .. } | Self::NoRefreshToken | Self::ReauthorizationRequired
        )
    }
}

/// Result type for OAuth operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(OAuthError::InvalidConfig("missing secret".into()).is_config());
        assert!(!OAuthError::NoRefreshToken.is_config());
        assert!(OAuthError::NoRefreshToken.requires_reauthorization());
        assert!(
            OAuthError::RefreshFailed {
                status: 400,
                message: "invalid_grant".into()
            }
            .requires_reauthorization()
        );
        assert!(!OAuthError::Storage("disk full".into()).is_transport());
    }

    #[test]
    fn messages_name_the_failure() {
        let err = OAuthError::TokenExchangeFailed {
            status: 401,
            message: "invalid_client: Client authentication failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "Token exchange failed (401): invalid_client: Client authentication failed"
        );
    }
}
