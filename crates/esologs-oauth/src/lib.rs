//! ESO Logs OAuth - credential flows and token lifecycle for the ESO Logs API
//!
//! This crate provides:
//!
//! - **Client credentials**: app-level tokens for the public client API
//! - **Authorization code**: user-level tokens (optionally with PKCE), with a
//!   local callback listener for the browser redirect
//! - **Token lifecycle**: absolute expiry, skew-aware expiry checks, refresh
//! - **Token cache**: single-flight refresh shared across concurrent callers
//! - **Persistence**: in-memory and JSON file token stores
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use esologs_oauth::{OAuth2Client, OAuth2Config, ProviderEndpoints};
//!
//! let config = OAuth2Config::new("client_id", "client_secret", ProviderEndpoints::esologs())
//!     .with_redirect_uri("http://localhost:8765/callback");
//! let client = OAuth2Client::new(config)?;
//!
//! // App-level access
//! let token = client.acquire_app_token().await?;
//!
//! // User-level access
//! let request = client.begin_user_authorization(&["view-user-profile"])?;
//! let listener = request.callback_listener().await?;
//! println!("Open {}", request.url());
//! let code = listener.wait_for_code(request.state(), DEFAULT_CALLBACK_TIMEOUT).await?;
//! let token = client.complete_user_authorization(&request, &code).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod cache;
mod callback;
mod error;
mod oauth2;
mod pkce;
mod provider;
mod store;
mod token;

pub use cache::*;
pub use callback::*;
pub use error::*;
pub use oauth2::*;
pub use pkce::*;
pub use provider::*;
pub use store::*;
pub use token::*;

use std::time::Duration;

/// Default expiry skew: a token this close to expiry is treated as expired.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::from_secs(60);

/// Default time to wait for the browser redirect during user authorization.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// OAuth grant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization code grant (user authorization flow).
    AuthorizationCode,
    /// Client credentials grant (app-level access).
    ClientCredentials,
    /// Refresh token grant.
    RefreshToken,
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorizationCode => write!(f, "authorization_code"),
            Self::ClientCredentials => write!(f, "client_credentials"),
            Self::RefreshToken => write!(f, "refresh_token"),
        }
    }
}

/// How the client authenticates itself at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientAuthMethod {
    /// HTTP Basic `Authorization` header (`client_secret_basic`).
    #[default]
    BasicHeader,
    /// `client_id` and `client_secret` in the form body (`client_secret_post`).
    RequestBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_type_wire_names() {
        assert_eq!(GrantType::AuthorizationCode.to_string(), "authorization_code");
        assert_eq!(GrantType::ClientCredentials.to_string(), "client_credentials");
        assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
    }
}
