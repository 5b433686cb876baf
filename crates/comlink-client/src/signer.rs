//! HMAC request signing.
//!
//! The MAC input is the concatenation of the millisecond timestamp, the HTTP
//! method, the endpoint path and the hex MD5 of the body:
//!
//! ```text
//! HMAC-SHA256(secret, timestamp || "POST" || "/player" || hex(md5(body)))
//! ```
//!
//! MD5 is what the gateway expects; it is only a fingerprint of the body fed
//! into the MAC and offers no collision resistance on its own.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use comlink_common_http::{headers, RequestDescriptor};

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

/// Only POST requests are signed.
const SIGNED_METHOD: &str = "POST";

/// Source of the signing timestamp.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("failed to serialize payload for signing: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to initialise HMAC: {0}")]
    Mac(String),
}

/// Headers produced for one signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `X-Date` value: milliseconds since the epoch, in decimal.
    pub timestamp: String,
    /// `Authorization` value.
    pub authorization: String,
}

impl SignedHeaders {
    /// Add `X-Date` and `Authorization` to `request`.
    pub fn apply(self, request: RequestDescriptor) -> RequestDescriptor {
        request
            .header(headers::X_DATE, self.timestamp)
            .header(headers::AUTHORIZATION, self.authorization)
    }
}

/// Hex MD5 of `body`.
pub fn content_digest(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}

/// Signs request bodies with a shared secret.
#[derive(Clone)]
pub struct RequestSigner {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_clock(credentials, Arc::new(SystemClock))
    }

    pub fn with_clock(credentials: Credentials, clock: Arc<dyn Clock>) -> Self {
        Self { credentials, clock }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign an already serialized body for `endpoint` at the current time.
    pub fn sign(&self, endpoint: &str, body: &[u8]) -> Result<SignedHeaders, SigningError> {
        self.sign_at(self.clock.now_millis(), endpoint, body)
    }

    /// Serialize `payload` and sign the resulting bytes.
    pub fn sign_payload<T: Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<SignedHeaders, SigningError> {
        let body = serde_json::to_vec(payload)?;
        self.sign(endpoint, &body)
    }

    /// Sign `body` for `endpoint` as of `timestamp_ms`.
    pub fn sign_at(
        &self,
        timestamp_ms: u64,
        endpoint: &str,
        body: &[u8],
    ) -> Result<SignedHeaders, SigningError> {
        let timestamp = timestamp_ms.to_string();

        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key().expose().as_bytes())
            .map_err(|e| SigningError::Mac(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(SIGNED_METHOD.as_bytes());
        mac.update(endpoint.as_bytes());
        mac.update(content_digest(body).as_bytes());

        let signature = hex::encode(mac.finalize().into_bytes());
        tracing::debug!(endpoint, timestamp = %timestamp, "Signed request");

        Ok(SignedHeaders {
            authorization: format!(
                "HMAC-SHA256 Credential={},Signature={}",
                self.credentials.access_key(),
                signature
            ),
            timestamp,
        })
    }
}
