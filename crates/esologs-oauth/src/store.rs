//! Durable token persistence keyed by session identifier.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::{OAuthError, OAuthResult, Token};

/// Session key for the persisted user token.
pub const DEFAULT_TOKEN_KEY: &str = ".esologs_token";

/// File name [`FileTokenStore`] uses for [`DEFAULT_TOKEN_KEY`].
pub const DEFAULT_TOKEN_FILE: &str = ".esologs_token.json";

/// Session key for the persisted client credentials token.
pub const APP_TOKEN_KEY: &str = ".esologs_app_token";

/// A keyed store for tokens.
///
/// Implementations must round-trip every [`Token`] field, `expires_at`
/// included, without recomputing anything relative to load time.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Load the token stored under `key`.
    fn load(&self, key: &str) -> OAuthResult<Option<Token>>;

    /// Store `token` under `key`, replacing any previous value.
    fn save(&self, key: &str, token: &Token) -> OAuthResult<()>;

    /// Remove the token stored under `key`, returning it if present.
    fn remove(&self, key: &str) -> OAuthResult<Option<Token>>;
}

/// In-memory token storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, Token>>>,
}

impl MemoryTokenStore {
    /// Create a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all stored keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.tokens.read().keys().cloned().collect()
    }

    /// Clear all tokens.
    pub fn clear(&self) {
        self.tokens.write().clear();
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> OAuthResult<Option<Token>> {
        Ok(self.tokens.read().get(key).cloned())
    }

    fn save(&self, key: &str, token: &Token) -> OAuthResult<()> {
        self.tokens.write().insert(key.to_string(), token.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> OAuthResult<Option<Token>> {
        Ok(self.tokens.write().remove(key))
    }
}

/// One pretty-printed JSON file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated token file behind.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Store files under `dir` (created on first save).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the token files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> OAuthResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> OAuthResult<Option<Token>> {
        let path = self.path_for(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error(&path, &err)),
        };
        let token = serde_json::from_str(&contents).map_err(|e| {
            OAuthError::Storage(format!("{} holds an unreadable token: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded persisted token");
        Ok(Some(token))
    }

    fn save(&self, key: &str, token: &Token) -> OAuthResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| storage_error(&self.dir, &e))?;

        let json = serde_json::to_vec_pretty(token)?;
        let tmp = path.with_extension("json.tmp");
        write_private(&tmp, &json).map_err(|e| storage_error(&tmp, &e))?;
        fs::rename(&tmp, &path).map_err(|e| storage_error(&path, &e))?;
        debug!(path = %path.display(), "persisted token");
        Ok(())
    }

    fn remove(&self, key: &str) -> OAuthResult<Option<Token>> {
        let existing = self.load(key)?;
        if existing.is_some() {
            let path = self.path_for(key)?;
            fs::remove_file(&path).map_err(|e| storage_error(&path, &e))?;
        }
        Ok(existing)
    }
}

fn validate_key(key: &str) -> OAuthResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && key.chars().any(|c| c != '.');
    if valid {
        Ok(())
    } else {
        Err(OAuthError::Storage(format!(
            "invalid session key {key:?}: use ASCII letters, digits, '-', '_' or '.'"
        )))
    }
}

fn storage_error(path: &Path, err: &std::io::Error) -> OAuthError {
    OAuthError::Storage(format!("{}: {err}", path.display()))
}

#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
