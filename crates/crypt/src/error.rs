//! Error type returned by every codec operation.

use thiserror::Error;

/// Errors produced by the codec.
///
/// Every variant is terminal for the call that produced it. The messages are
/// safe to show to end users: they never contain key, IV or plaintext bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptError {
    /// The requested cipher is not AES-128-CBC or AES-256-CBC.
    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// The secret key could not be decoded or has the wrong length.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The block-cipher transform could not produce a ciphertext.
    #[error("Could not encrypt the data.")]
    Encryption,

    /// The payload could not be encoded to JSON.
    #[error("Could not encode the payload.")]
    Encoding,

    /// The outer encoding or the payload structure is invalid.
    #[error("The payload is invalid.")]
    Payload,

    /// The payload MAC does not match the recomputed tag.
    #[error("The MAC is invalid.")]
    Authentication,

    /// The block-cipher transform rejected the ciphertext.
    #[error("Could not decrypt the data.")]
    Decryption,

    /// The injected serializer could not encode or decode the value.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CryptError {
    /// Short machine-readable name of the failure kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            CryptError::UnsupportedCipher(_) => "unsupported_cipher",
            CryptError::InvalidKey(_) => "invalid_key",
            CryptError::Encryption => "encryption",
            CryptError::Encoding => "encoding",
            CryptError::Payload => "payload",
            CryptError::Authentication => "authentication",
            CryptError::Decryption => "decryption",
            CryptError::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_reference_wording() {
        assert_eq!(CryptError::Payload.to_string(), "The payload is invalid.");
        assert_eq!(CryptError::Authentication.to_string(), "The MAC is invalid.");
        assert_eq!(
            CryptError::Decryption.to_string(),
            "Could not decrypt the data."
        );
    }

    #[test]
    fn display_includes_detail() {
        let e = CryptError::InvalidKey("expected 32 bytes, got 16".into());
        assert!(e.to_string().contains("expected 32 bytes"));
        assert_eq!(e.kind(), "invalid_key");
    }
}
