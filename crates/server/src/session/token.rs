//! Signed session tokens.
//!
//! Tokens are compact JWS strings (`header.payload.signature`, base64url
//! without padding) signed with HMAC-SHA256. The payload is the caller's
//! claims plus `iat` and `exp` in seconds since the Unix epoch.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use sha2::Sha256;
use thiserror::Error;

use contest_hub_core::Document;

type HmacSha256 = Hmac<Sha256>;

/// Days until an issued token expires.
pub const TOKEN_LIFETIME_DAYS: i64 = 365;

/// Errors that can occur while signing a token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token segment: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Signs claim sets into bearer tokens with a server-held secret.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SecretString,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenSigner {
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Sign `claims`, issued now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if a segment cannot be encoded or the key is rejected.
    pub fn sign(&self, claims: &Document) -> Result<String, TokenError> {
        self.sign_at(claims, Utc::now())
    }

    /// Sign `claims` as if issued at `issued_at`.
    ///
    /// Caller-supplied `iat`/`exp` are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `TokenError` if a segment cannot be encoded or the key is rejected.
    pub fn sign_at(&self, claims: &Document, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = issued_at + Duration::days(TOKEN_LIFETIME_DAYS);

        let mut payload = claims.clone();
        payload.insert("iat".to_string(), Value::from(issued_at.timestamp()));
        payload.insert("exp".to_string(), Value::from(expires_at.timestamp()));

        let header = json!({"alg": "HS256", "typ": "JWT"});
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?),
        );

        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }
}
