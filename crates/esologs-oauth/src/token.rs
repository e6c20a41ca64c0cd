//! OAuth token types and expiry handling.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OAuthError, OAuthResult};

/// OAuth token response from the provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// Lifetime in seconds, relative to the moment the response was produced.
    #[serde(default)]
    pub expires_in: Option<u64>,

    /// Refresh token (if provided).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Granted scopes (space-separated).
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &REDACTED)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("scope", &self.scope)
            .finish()
    }
}

const REDACTED: &str = "[REDACTED]";

/// Lifecycle position of a token relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No token has been issued yet.
    Unissued,
    /// Usable as-is.
    Valid,
    /// Still accepted by the provider, but inside the expiry skew.
    ExpiringSoon,
    /// Past its expiry instant.
    Expired,
}

impl TokenState {
    /// Whether a token in this state may authorize a request.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A bearer credential with an absolute expiry instant.
///
/// Tokens are immutable once issued; a refresh produces a new `Token` that
/// replaces the old one wholesale. The serialized form stores `expires_at`
/// as an RFC 3339 instant so a token reloaded after a restart keeps its
/// original expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    token_type: String,
    expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

impl Token {
    /// Create a token from its parts.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: token_type.into(),
            expires_at,
            scope: None,
        }
    }

    /// Attach a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Attach the granted scope string.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Build a token from a provider response received at `received_at`.
    ///
    /// The relative `expires_in` is converted to an absolute instant here and
    /// never stored.
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> OAuthResult<Self> {
        if response.access_token.is_empty() {
            return Err(OAuthError::InvalidTokenResponse(
                "empty access_token".to_string(),
            ));
        }
        if response.token_type.is_empty() {
            return Err(OAuthError::InvalidTokenResponse(
                "empty token_type".to_string(),
            ));
        }
        let expires_in = response.expires_in.ok_or_else(|| {
            OAuthError::InvalidTokenResponse("missing expires_in".to_string())
        })?;
        let expires_at = i64::try_from(expires_in)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .and_then(|lifetime| received_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                OAuthError::InvalidTokenResponse(format!("expires_in out of range: {expires_in}"))
            })?;

        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.filter(|rt| !rt.is_empty()),
            token_type: response.token_type,
            expires_at,
            scope: response.scope,
        })
    }

    /// Build the replacement for `previous` from a refresh response.
    ///
    /// Providers may omit the refresh token on refresh; the previous one is
    /// carried over in that case.
    pub fn from_refresh_response(
        response: TokenResponse,
        previous: &Self,
        received_at: DateTime<Utc>,
    ) -> OAuthResult<Self> {
        let mut token = Self::from_response(response, received_at)?;
        if token.refresh_token.is_none() {
            token.refresh_token.clone_from(&previous.refresh_token);
        }
        if token.scope.is_none() {
            token.scope.clone_from(&previous.scope);
        }
        Ok(token)
    }

    /// Get the access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Get the token type.
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Get the refresh token if available.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Get the granted scope string.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Get the granted scopes as a list.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Absolute expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check whether the token is expired, or will be within `skew`.
    #[must_use]
    pub fn is_expired(&self, skew: Duration) -> bool {
        self.is_expired_at(Utc::now(), skew)
    }

    /// Pure form of [`Token::is_expired`]: `now + skew >= expires_at`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        // Use saturating conversion to avoid panic on extreme durations
        let skew = chrono::Duration::from_std(skew).unwrap_or(chrono::TimeDelta::MAX);
        now.checked_add_signed(skew)
            .is_none_or(|deadline| deadline >= self.expires_at)
    }

    /// Lifecycle state at `now`.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>, skew: Duration) -> TokenState {
        if now >= self.expires_at {
            TokenState::Expired
        } else if self.is_expired_at(now, skew) {
            TokenState::ExpiringSoon
        } else {
            TokenState::Valid
        }
    }

    /// Get time until expiration, if not yet expired.
    #[must_use]
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let now = Utc::now();
        if self.expires_at > now {
            (self.expires_at - now).to_std().ok()
        } else {
            None
        }
    }

    /// Get the authorization header value.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &REDACTED)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Pure expiry check: `now + skew_seconds >= expires_at`.
#[must_use]
pub fn is_expired(token: &Token, skew_seconds: u64) -> bool {
    token.is_expired(Duration::from_secs(skew_seconds))
}
