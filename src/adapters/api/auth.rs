//! Builder Authentication — HMAC-SHA256 Request Signing
//!
//! Signs relay service requests with the builder API credentials.
//! Credentials come from environment variables (BUILDER_KEY,
//! BUILDER_SECRET, BUILDER_PASSPHRASE).

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};

/// Header carrying the builder API key.
pub const HEADER_API_KEY: &str = "POLY_BUILDER_API_KEY";
/// Header carrying the signing timestamp.
pub const HEADER_TIMESTAMP: &str = "POLY_BUILDER_TIMESTAMP";
/// Header carrying the passphrase.
pub const HEADER_PASSPHRASE: &str = "POLY_BUILDER_PASSPHRASE";
/// Header carrying the HMAC signature.
pub const HEADER_SIGNATURE: &str = "POLY_BUILDER_SIGNATURE";

/// Signed header set for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderHeaders {
    pub api_key: String,
    pub timestamp: String,
    pub passphrase: String,
    pub signature: String,
}

impl BuilderHeaders {
    /// `(name, value)` pairs ready for a request builder.
    pub fn pairs(&self) -> [(&'static str, &str); 4] {
        [
            (HEADER_API_KEY, self.api_key.as_str()),
            (HEADER_TIMESTAMP, self.timestamp.as_str()),
            (HEADER_PASSPHRASE, self.passphrase.as_str()),
            (HEADER_SIGNATURE, self.signature.as_str()),
        ]
    }
}

/// Builder API authentication handler.
///
/// The secret is base64 and is decoded once at construction; only the
/// computed signature is ever sent.
pub struct BuilderAuth {
    /// API key from BUILDER_KEY.
    api_key: String,
    /// Decoded HMAC key from BUILDER_SECRET.
    secret: Vec<u8>,
    /// Passphrase from BUILDER_PASSPHRASE.
    passphrase: String,
}

impl BuilderAuth {
    /// Build from explicit credentials.
    pub fn new(api_key: String, secret: &str, passphrase: String) -> Result<Self> {
        let secret = STANDARD
            .decode(secret)
            .or_else(|_| URL_SAFE.decode(secret))
            .or_else(|_| URL_SAFE_NO_PAD.decode(secret))
            .context("BUILDER_SECRET is not valid base64")?;
        Ok(Self {
            api_key,
            secret,
            passphrase,
        })
    }

    /// Load credentials from environment variables.
    ///
    /// Returns `Ok(None)` when no builder key is configured at all.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(api_key) = std::env::var("BUILDER_KEY") else {
            return Ok(None);
        };
        let secret = std::env::var("BUILDER_SECRET").context("BUILDER_SECRET not set")?;
        let passphrase =
            std::env::var("BUILDER_PASSPHRASE").context("BUILDER_PASSPHRASE not set")?;
        Self::new(api_key, &secret, passphrase).map(Some)
    }

    /// Get the API key for request headers.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Current Unix timestamp in seconds.
    pub fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }

    /// Sign a request: `base64url(HMAC-SHA256(secret, timestamp + method + path + body))`.
    pub fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> String {
        let message = format!("{timestamp}{method}{path}{body}");
        let mac = hmac_sha256::HMAC::mac(message.as_bytes(), &self.secret);
        URL_SAFE.encode(mac)
    }

    /// Build all authentication headers for a request.
    pub fn headers(&self, method: &str, path: &str, body: &str) -> BuilderHeaders {
        self.headers_at(&Self::timestamp(), method, path, body)
    }

    /// Same as [`Self::headers`] with a fixed timestamp.
    pub fn headers_at(&self, timestamp: &str, method: &str, path: &str, body: &str) -> BuilderHeaders {
        BuilderHeaders {
            api_key: self.api_key.clone(),
            timestamp: timestamp.to_string(),
            passphrase: self.passphrase.clone(),
            signature: self.sign(timestamp, method, path, body),
        }
    }
}

impl std::fmt::Debug for BuilderAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderAuth")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}
