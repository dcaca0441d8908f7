//! Request and response types of the JSON API.
//!
//! Every request carries the key size and the base64 secret key; the service
//! keeps no key between requests.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Encrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// AES key size in bits: `128` or `256`.
    pub key_size: u16,
    /// Base64-encoded secret key, optionally prefixed with `base64:`.
    pub secret_key: String,
    /// Text to encrypt.
    pub plaintext: String,
    /// Wrap the plaintext in PHP `serialize()` form before encrypting.
    #[serde(default)]
    pub serialize: bool,
}

/// Successful response body for `POST /api/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Outer payload string, `base64(JSON{iv, value, mac})`.
    pub payload: String,
}

// ---------------------------------------------------------------------------
// Decrypt endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    /// AES key size in bits: `128` or `256`.
    pub key_size: u16,
    /// Base64-encoded secret key, optionally prefixed with `base64:`.
    pub secret_key: String,
    /// Outer payload string to decrypt.
    pub payload: String,
    /// Unwrap a PHP `serialize()`d string after decrypting.
    #[serde(default)]
    pub unserialize: bool,
}

/// Successful response body for `POST /api/decrypt`.
///
/// Exactly one of the two fields is present: `plaintext` when the decrypted
/// bytes are UTF-8, `plaintext_base64` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plaintext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plaintext_base64: Option<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving.
    pub status: String,
    /// Crate version of the running service.
    pub version: String,
}
