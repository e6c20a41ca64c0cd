//! Shared token cache with single-flight renewal.
//!
//! Any number of tasks may ask a [`TokenCache`] for a token at once. While the
//! cached token is valid they all get it without touching the network. Once it
//! falls inside the expiry skew, the first caller to take the renewal lock
//! performs exactly one exchange and every waiter reuses its result.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, instrument, warn};

use crate::{DEFAULT_EXPIRY_SKEW, OAuth2Client, OAuthError, OAuthResult, Token, TokenState, TokenStore};

/// Source of fresh tokens for a [`TokenCache`].
#[async_trait]
pub trait TokenProvider: Send + Sync + fmt::Debug {
    /// Obtain a token without any prior credential.
    async fn acquire(&self) -> OAuthResult<Token>;

    /// Replace `current`, which is expired or about to be.
    async fn refresh(&self, current: &Token) -> OAuthResult<Token>;
}

/// App-level tokens via the client credentials grant.
///
/// There is no refresh token in this flow, so renewal is a fresh grant.
#[derive(Debug, Clone)]
pub struct ClientCredentialsProvider {
    client: OAuth2Client,
}

impl ClientCredentialsProvider {
    /// Wrap a configured client.
    #[must_use]
    pub const fn new(client: OAuth2Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn acquire(&self) -> OAuthResult<Token> {
        self.client.acquire_app_token().await
    }

    async fn refresh(&self, _current: &Token) -> OAuthResult<Token> {
        self.client.acquire_app_token().await
    }
}

/// User-level tokens obtained through the authorization code flow.
///
/// The cache must be seeded with the token from the code exchange; after
/// that, renewal uses the refresh token.
#[derive(Debug, Clone)]
pub struct AuthorizationCodeProvider {
    client: OAuth2Client,
}

impl AuthorizationCodeProvider {
    /// Wrap a configured client.
    #[must_use]
    pub const fn new(client: OAuth2Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenProvider for AuthorizationCodeProvider {
    async fn acquire(&self) -> OAuthResult<Token> {
        Err(OAuthError::ReauthorizationRequired)
    }

    async fn refresh(&self, current: &Token) -> OAuthResult<Token> {
        self.client.refresh(current).await
    }
}

struct Persistence {
    store: Arc<dyn TokenStore>,
    key: String,
}

/// Cached token plus the machinery to renew it.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    current: RwLock<Option<Token>>,
    renew_lock: tokio::sync::Mutex<()>,
    skew: Duration,
    persistence: Option<Persistence>,
    exchanges: AtomicU64,
}

impl TokenCache {
    /// Create an empty cache backed by `provider`.
    #[must_use]
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
            renew_lock: tokio::sync::Mutex::new(()),
            skew: DEFAULT_EXPIRY_SKEW,
            persistence: None,
            exchanges: AtomicU64::new(0),
        }
    }

    /// Treat tokens within `skew` of expiry as expired.
    #[must_use]
    pub const fn with_skew(mut self, skew: Duration) -> Self {
        self.skew = skew;
        self
    }

    /// Persist every newly issued token to `store` under `key`.
    ///
    /// A failed write after a renewal is returned from [`TokenCache::token`];
    /// the renewed token is still cached and served to the next caller.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn TokenStore>, key: impl Into<String>) -> Self {
        self.persistence = Some(Persistence {
            store,
            key: key.into(),
        });
        self
    }

    /// Expiry skew in effect.
    #[must_use]
    pub const fn skew(&self) -> Duration {
        self.skew
    }

    /// Snapshot of the cached token, whatever its state.
    #[must_use]
    pub fn current(&self) -> Option<Token> {
        self.current.read().clone()
    }

    /// Lifecycle state of the cached token.
    #[must_use]
    pub fn state(&self) -> TokenState {
        self.current
            .read()
            .as_ref()
            .map_or(TokenState::Unissued, |token| token.state_at(Utc::now(), self.skew))
    }

    /// Number of token exchanges this cache has performed.
    #[must_use]
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    /// Return a valid token, renewing it first if needed.
    ///
    /// Concurrent callers that find the token expired share a single exchange.
    /// On failure the previously cached token is left in place.
    #[instrument(skip(self))]
    pub async fn token(&self) -> OAuthResult<Token> {
        if let Some(token) = self.usable() {
            return Ok(token);
        }

        let _guard = self.renew_lock.lock().await;

        // Another caller may have renewed while we waited.
        if let Some(token) = self.usable() {
            debug!("token renewed by concurrent caller");
            return Ok(token);
        }

        self.renew().await
    }

    /// Renew unconditionally, e.g. after the API rejected the cached token.
    #[instrument(skip(self))]
    pub async fn force_refresh(&self) -> OAuthResult<Token> {
        let _guard = self.renew_lock.lock().await;
        self.renew().await
    }

    /// Install a token obtained elsewhere (typically a code exchange).
    pub fn seed(&self, token: Token) -> OAuthResult<()> {
        self.persist(&token)?;
        *self.current.write() = Some(token);
        Ok(())
    }

    /// Load a previously persisted token into the cache.
    ///
    /// Returns the loaded token, which may already be expired; the next
    /// [`TokenCache::token`] call renews it as usual.
    pub fn load_from_store(&self) -> OAuthResult<Option<Token>> {
        let Some(persistence) = &self.persistence else {
            return Ok(None);
        };
        let loaded = persistence.store.load(&persistence.key)?;
        if let Some(token) = &loaded {
            debug!(expires_at = %token.expires_at(), "restored persisted token");
            *self.current.write() = Some(token.clone());
        }
        Ok(loaded)
    }

    /// Drop the cached token and its persisted copy.
    pub fn clear(&self) -> OAuthResult<()> {
        *self.current.write() = None;
        if let Some(persistence) = &self.persistence {
            persistence.store.remove(&persistence.key)?;
        }
        Ok(())
    }

    fn usable(&self) -> Option<Token> {
        self.current
            .read()
            .as_ref()
            .filter(|token| !token.is_expired(self.skew))
            .cloned()
    }

    // Caller must hold `renew_lock`.
    async fn renew(&self) -> OAuthResult<Token> {
        let previous = self.current();
        self.exchanges.fetch_add(1, Ordering::Relaxed);

        let result = match &previous {
            Some(token) => self.provider.refresh(token).await,
            None => self.provider.acquire().await,
        };

        let token = match result {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "token renewal failed");
                return Err(err);
            }
        };

        *self.current.write() = Some(token.clone());
        debug!(expires_at = %token.expires_at(), "token renewed");

        // The cache keeps the new token even when the store write fails.
        if let Err(err) = self.persist(&token) {
            warn!(error = %err, "failed to persist renewed token");
            return Err(err);
        }
        Ok(token)
    }

    fn persist(&self, token: &Token) -> OAuthResult<()> {
        match &self.persistence {
            Some(persistence) => persistence.store.save(&persistence.key, token),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("provider", &self.provider)
            .field("state", &self.state())
            .field("skew", &self.skew)
            .field("persistent", &self.persistence.is_some())
            .field("exchanges", &self.exchange_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryTokenStore;
    use std::sync::atomic::AtomicBool;

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicU64,
        fail: AtomicBool,
    }

    impl CountingProvider {
        fn issue(&self) -> OAuthResult<Token> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(OAuthError::RefreshFailed {
                    status: 400,
                    message: "invalid_grant".into(),
                });
            }
            Ok(Token::new(
                format!("token-{n}"),
                "Bearer",
                Utc::now() + chrono::Duration::hours(1),
            ))
        }
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn acquire(&self) -> OAuthResult<Token> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.issue()
        }

        async fn refresh(&self, _current: &Token) -> OAuthResult<Token> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.issue()
        }
    }

    fn expired_token() -> Token {
        Token::new("stale", "Bearer", Utc::now() - chrono::Duration::seconds(5))
            .with_refresh_token("r")
    }

    #[tokio::test]
    async fn test_first_call_acquires() {
        let provider = Arc::new(CountingProvider::default());
        let cache = TokenCache::new(provider.clone());
        assert_eq!(cache.state(), TokenState::Unissued);

        let token = cache.token().await.unwrap();
        assert_eq!(token.access_token(), "token-1");
        assert_eq!(cache.state(), TokenState::Valid);

        // Valid tokens are served from the cache.
        cache.token().await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_exchange() {
        let provider = Arc::new(CountingProvider::default());
        let cache = Arc::new(TokenCache::new(provider.clone()));
        cache.seed(expired_token()).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.token().await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.unwrap().unwrap();
            assert_eq!(token.access_token(), "token-1");
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.exchange_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_renewal_keeps_previous_token() {
        let provider = Arc::new(CountingProvider::default());
        provider.fail.store(true, Ordering::SeqCst);
        let cache = TokenCache::new(provider.clone());
        cache.seed(expired_token()).unwrap();

        let err = cache.token().await.unwrap_err();
        assert!(err.requires_reauthorization());
        assert_eq!(cache.current().unwrap().access_token(), "stale");
        assert_eq!(cache.state(), TokenState::Expired);
    }

    #[tokio::test]
    async fn test_token_inside_skew_is_renewed() {
        let provider = Arc::new(CountingProvider::default());
        let cache = TokenCache::new(provider.clone()).with_skew(Duration::from_secs(120));
        cache
            .seed(Token::new(
                "soon",
                "Bearer",
                Utc::now() + chrono::Duration::seconds(60),
            ))
            .unwrap();
        assert_eq!(cache.state(), TokenState::ExpiringSoon);

        let token = cache.token().await.unwrap();
        assert_eq!(token.access_token(), "token-1");
    }

    #[tokio::test]
    async fn test_force_refresh() {
        let provider = Arc::new(CountingProvider::default());
        let cache = TokenCache::new(provider.clone());
        cache.token().await.unwrap();

        let token = cache.force_refresh().await.unwrap();
        assert_eq!(token.access_token(), "token-2");
    }

    #[tokio::test]
    async fn test_persists_and_restores() {
        let store = Arc::new(MemoryTokenStore::new());
        let provider = Arc::new(CountingProvider::default());

        let cache = TokenCache::new(provider.clone()).with_store(store.clone(), "session");
        let issued = cache.token().await.unwrap();
        assert_eq!(store.load("session").unwrap(), Some(issued.clone()));

        let restored = TokenCache::new(provider.clone()).with_store(store.clone(), "session");
        assert_eq!(restored.load_from_store().unwrap(), Some(issued.clone()));
        assert_eq!(restored.token().await.unwrap(), issued);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        restored.clear().unwrap();
        assert!(store.load("session").unwrap().is_none());
        assert_eq!(restored.state(), TokenState::Unissued);
    }

    #[derive(Debug)]
    struct ReadOnlyStore;

    impl TokenStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> OAuthResult<Option<Token>> {
            Ok(None)
        }

        fn save(&self, _key: &str, _token: &Token) -> OAuthResult<()> {
            Err(OAuthError::Storage("read-only".into()))
        }

        fn remove(&self, _key: &str) -> OAuthResult<Option<Token>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_after_swap() {
        let provider = Arc::new(CountingProvider::default());
        let cache = TokenCache::new(provider.clone()).with_store(Arc::new(ReadOnlyStore), "session");

        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, OAuthError::Storage(_)));
        assert_eq!(cache.state(), TokenState::Valid);

        // The renewed token is served without another exchange.
        assert_eq!(cache.token().await.unwrap().access_token(), "token-1");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_authorization_code_provider_needs_seed() {
        let client = OAuth2Client::new(crate::OAuth2Config::new(
            "id",
            "secret",
            crate::ProviderEndpoints::esologs(),
        ))
        .unwrap();
        let cache = TokenCache::new(Arc::new(AuthorizationCodeProvider::new(client)));

        let err = cache.token().await.unwrap_err();
        assert!(matches!(err, OAuthError::ReauthorizationRequired));
    }
}
