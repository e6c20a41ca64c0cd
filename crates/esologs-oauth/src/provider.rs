//! ESO Logs endpoint set.

use serde::{Deserialize, Serialize};

/// Production site root.
pub const ESOLOGS_BASE_URL: &str = "https://www.esologs.com";

/// Provider endpoints used by the credential flows and the API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    /// Authorization endpoint (user flow).
    pub authorization_url: String,
    /// Token endpoint (all grants).
    pub token_url: String,
    /// GraphQL endpoint for app-level (client credentials) access.
    pub client_api_url: String,
    /// GraphQL endpoint for user-level access.
    pub user_api_url: String,
}

impl ProviderEndpoints {
    /// The public ESO Logs endpoints.
    #[must_use]
    pub fn esologs() -> Self {
        Self::with_base_url(ESOLOGS_BASE_URL)
    }

    /// ESO Logs endpoint layout under another site root (mirrors, mock servers).
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            authorization_url: format!("{base}/oauth/authorize"),
            token_url: format!("{base}/oauth/token"),
            client_api_url: format!("{base}/api/v2/client"),
            user_api_url: format!("{base}/api/v2/user"),
        }
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the authorization endpoint.
    #[must_use]
    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = url.into();
        self
    }
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self::esologs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esologs_endpoints() {
        let endpoints = ProviderEndpoints::esologs();

        assert_eq!(
            endpoints.authorization_url,
            "https://www.esologs.com/oauth/authorize"
        );
        assert_eq!(endpoints.token_url, "https://www.esologs.com/oauth/token");
        assert_eq!(
            endpoints.client_api_url,
            "https://www.esologs.com/api/v2/client"
        );
        assert_eq!(endpoints.user_api_url, "https://www.esologs.com/api/v2/user");
    }

    #[test]
    fn test_custom_base_url() {
        let endpoints = ProviderEndpoints::with_base_url("http://127.0.0.1:9999/")
            .with_token_url("http://127.0.0.1:9999/custom/token");

        assert_eq!(endpoints.token_url, "http://127.0.0.1:9999/custom/token");
        assert_eq!(
            endpoints.client_api_url,
            "http://127.0.0.1:9999/api/v2/client"
        );
    }
}
