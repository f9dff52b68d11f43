//! API credentials and request signing
//!
//! MEXC signs private REST calls with HMAC-SHA256 over the full query string
//! (parameters plus `timestamp`, optionally `recvWindow`). The signature is
//! appended as `signature=<lowercase hex>` and the access key travels in the
//! `X-MEXC-APIKEY` header.
//!
//! # Security
//!
//! Secret keys are stored using the `secrecy` crate which:
//! - Zeroizes memory on drop
//! - Prevents accidental logging via Debug impl
//! - Provides explicit access via `expose_secret()`

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the access key
pub const API_KEY_HEADER: &str = "X-MEXC-APIKEY";

/// API credentials for signed requests
pub struct Credentials {
    /// Access key (public)
    access_key: String,
    /// Secret key (zeroized on drop)
    secret_key: SecretString,
}

impl Credentials {
    /// Create credentials from an access key and secret key
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> AuthResult<Self> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();

        if access_key.is_empty() {
            return Err(AuthError::InvalidCredentials("access key is empty".into()));
        }
        if secret_key.is_empty() {
            return Err(AuthError::InvalidCredentials("secret key is empty".into()));
        }

        Ok(Self {
            access_key,
            secret_key: SecretString::from(secret_key),
        })
    }

    /// Create credentials from environment variables
    ///
    /// Reads `MEXC_API_KEY` and `MEXC_SECRET_KEY` from the environment.
    pub fn from_env() -> AuthResult<Self> {
        let access_key = std::env::var("MEXC_API_KEY")
            .map_err(|_| AuthError::EnvVarNotSet("MEXC_API_KEY".to_string()))?;
        let secret_key = std::env::var("MEXC_SECRET_KEY")
            .map_err(|_| AuthError::EnvVarNotSet("MEXC_SECRET_KEY".to_string()))?;

        Self::new(access_key, secret_key)
    }

    /// Get the access key
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Lowercase hex HMAC-SHA256 of `payload` keyed by the secret
    pub fn sign(&self, payload: &str) -> AuthResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .map_err(|e| AuthError::InvalidCredentials(e.to_string()))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self {
            access_key: self.access_key.clone(),
            secret_key: SecretString::from(self.secret_key.expose_secret().to_string()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible = self
            .access_key
            .char_indices()
            .nth(8)
            .map_or(self.access_key.as_str(), |(end, _)| &self.access_key[..end]);
        f.debug_struct("Credentials")
            .field("access_key", &format!("{}...", visible))
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Builds the signed query string for one request
#[derive(Debug)]
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
    timestamp: i64,
    recv_window: Option<u64>,
}

impl<'a> RequestSigner<'a> {
    /// Create a signer stamped with the current time
    pub fn new(credentials: &'a Credentials) -> Self {
        Self::at(credentials, chrono::Utc::now().timestamp_millis())
    }

    /// Create a signer with an explicit timestamp (epoch millis)
    pub fn at(credentials: &'a Credentials, timestamp: i64) -> Self {
        Self {
            credentials,
            timestamp,
            recv_window: None,
        }
    }

    /// Set the `recvWindow` parameter in milliseconds
    pub fn with_recv_window(mut self, millis: u64) -> Self {
        self.recv_window = Some(millis);
        self
    }

    /// Request timestamp in epoch millis
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Get the access key
    pub fn access_key(&self) -> &str {
        self.credentials.access_key()
    }

    /// Encode `params` with `timestamp` (and `recvWindow`), then append the signature
    pub fn signed_query(&self, params: &[(&str, &str)]) -> AuthResult<String> {
        let timestamp = self.timestamp.to_string();
        let recv_window = self.recv_window.map(|w| w.to_string());

        let mut all: Vec<(&str, &str)> = params.to_vec();
        if let Some(window) = recv_window.as_deref() {
            all.push(("recvWindow", window));
        }
        all.push(("timestamp", &timestamp));

        let query = serde_urlencoded::to_string(&all).map_err(|e| AuthError::Parse(e.to_string()))?;
        let signature = self.credentials.sign(&query)?;
        Ok(format!("{}&signature={}", query, signature))
    }
}
