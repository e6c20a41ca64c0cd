//! PKCE (RFC 7636) verifier/challenge pairs for the authorization code flow.
//!
//! ESO Logs accepts the `S256` challenge method only, so that is the only one
//! generated here.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::OAuthError;

/// Challenge method sent as `code_challenge_method`.
pub const PKCE_METHOD: &str = "S256";

const VERIFIER_BYTES: usize = 32;

/// PKCE verifier and challenge pair.
#[derive(Clone)]
pub struct Pkce {
    /// Sent with the code exchange; never leaves the client before that.
    verifier: String,
    /// Sent with the authorization request.
    challenge: String,
}

impl Pkce {
    /// Generate a fresh random pair.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        let challenge = challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// Rebuild a pair from a verifier kept across a process boundary.
    pub fn from_verifier(verifier: &str) -> Result<Self, OAuthError> {
        if !(43..=128).contains(&verifier.len()) {
            return Err(OAuthError::PkceError(format!(
                "Verifier must be 43-128 characters, got {}",
                verifier.len()
            )));
        }

        // Unreserved characters only
        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        {
            return Err(OAuthError::PkceError(
                "Verifier contains invalid characters".to_string(),
            ));
        }

        Ok(Self {
            verifier: verifier.to_string(),
            challenge: challenge_for(verifier),
        })
    }

    /// Get the code verifier.
    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Get the code challenge.
    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

impl std::fmt::Debug for Pkce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pkce")
            .field("verifier", &"[REDACTED]")
            .field("challenge", &self.challenge)
            .finish()
    }
}

fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
