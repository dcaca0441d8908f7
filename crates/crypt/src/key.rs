//! Raw secret key material.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::CipherSpec;
use crate::error::CryptError;
use crate::payload::strip_whitespace;

/// Prefix Laravel puts in front of a base64 `APP_KEY`.
const BASE64_PREFIX: &str = "base64:";

/// Secret key bytes, zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Decode a base64 key string, accepting an optional `base64:` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::InvalidKey`] if the string is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptError> {
        let encoded = strip_whitespace(encoded);
        let encoded = encoded.strip_prefix(BASE64_PREFIX).unwrap_or(&encoded);
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|_| CryptError::InvalidKey("key is not valid base64".into()))
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Check that the key length matches what `spec` requires.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::InvalidKey`] on a length mismatch.
    pub fn check_length(&self, spec: CipherSpec) -> Result<(), CryptError> {
        if self.0.len() != spec.key_len() {
            return Err(CryptError::InvalidKey(format!(
                "{spec} requires a {}-byte key, got {} bytes",
                spec.key_len(),
                self.0.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_and_prefixed_keys() {
        let plain = SecretKey::from_base64("AAECAwQFBgcICQoLDA0ODw==").unwrap();
        let prefixed = SecretKey::from_base64("base64:AAECAwQFBgcICQoLDA0ODw==").unwrap();
        assert_eq!(plain.as_bytes(), prefixed.as_bytes());
        assert_eq!(plain.len(), 16);
    }

    #[test]
    fn ignores_whitespace_inside_key() {
        let wrapped = SecretKey::from_base64(" base64:AAECAwQF\nBgcICQoL\r\nDA0ODw==\t").unwrap();
        let plain = SecretKey::from_base64("AAECAwQFBgcICQoLDA0ODw==").unwrap();
        assert_eq!(wrapped.as_bytes(), plain.as_bytes());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            SecretKey::from_base64("not base64!"),
            Err(CryptError::InvalidKey(_))
        ));
    }

    #[test]
    fn length_check_against_cipher() {
        let key = SecretKey::from_bytes(vec![0u8; 16]);
        assert!(key.check_length(CipherSpec::Aes128Cbc).is_ok());
        assert!(key.check_length(CipherSpec::Aes256Cbc).is_err());
    }

    #[test]
    fn debug_redacts_key_material() {
        let key = SecretKey::from_bytes(vec![0xAB; 32]);
        let dbg = format!("{key:?}");
        assert!(!dbg.contains("171"));
        assert!(dbg.contains("REDACTED"));
    }
}
