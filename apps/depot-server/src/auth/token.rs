//! Signed bearer tokens binding a username.
//!
//! A token is `base64url(username).hex(mac)` where the MAC is a keyed
//! SHA-256 over the username with the process-wide secret on both sides.
//! Tokens are stateless and carry no expiry; a new login simply supersedes
//! the previous token on the client.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token")]
    Invalid,
}

/// Issues and validates signed bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
}

impl TokenService {
    /// The secret is validated non-empty at configuration time; an empty
    /// secret here is a programming error.
    pub fn new(secret: String) -> Self {
        debug_assert!(!secret.is_empty());
        Self { secret }
    }

    /// Produce a signed token for a username.
    pub fn issue(&self, username: &str) -> String {
        let payload = URL_SAFE_NO_PAD.encode(username.as_bytes());
        format!("{payload}.{}", self.mac(username))
    }

    /// Verify a token's signature and extract the username it binds.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        let (payload, mac) = token.split_once('.').ok_or(AuthError::Invalid)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::Invalid)?;
        let username = String::from_utf8(bytes).map_err(|_| AuthError::Invalid)?;
        if self.mac(&username) != mac {
            return Err(AuthError::Invalid);
        }
        Ok(username)
    }

    fn mac(&self, username: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update([0u8]);
        hasher.update(username.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}
