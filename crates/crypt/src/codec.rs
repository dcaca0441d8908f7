//! The authenticated codec: AES-CBC encryption with an HMAC-SHA256 tag,
//! framed as an Illuminate-compatible payload string.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::cipher::{self, CipherSpec, IV_LEN};
use crate::error::CryptError;
use crate::key::SecretKey;
use crate::mac;
use crate::payload::Payload;
use crate::serializer::{PhpStringSerializer, ValueSerializer};

/// Encrypts values into payload strings and decrypts them back.
///
/// The key is read-only after construction, so a single codec can be shared
/// across threads.
#[derive(Clone)]
pub struct AuthenticatedCodec {
    cipher: CipherSpec,
    key: SecretKey,
    serializer: Arc<dyn ValueSerializer>,
}

impl AuthenticatedCodec {
    /// Build a codec from a base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::InvalidKey`] if the key is not valid base64 or its
    /// decoded length does not match `cipher`.
    pub fn new(cipher: CipherSpec, base64_key: &str) -> Result<Self, CryptError> {
        Self::with_key(cipher, SecretKey::from_base64(base64_key)?)
    }

    /// Build a codec from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::InvalidKey`] if the key length does not match `cipher`.
    pub fn from_raw_key(cipher: CipherSpec, key: &[u8]) -> Result<Self, CryptError> {
        Self::with_key(cipher, SecretKey::from_bytes(key))
    }

    fn with_key(cipher: CipherSpec, key: SecretKey) -> Result<Self, CryptError> {
        key.check_length(cipher)?;
        Ok(Self {
            cipher,
            key,
            serializer: Arc::new(PhpStringSerializer),
        })
    }

    /// Replace the serializer used when the `serialize` flags are set.
    pub fn with_serializer(mut self, serializer: Arc<dyn ValueSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// The cipher this codec encrypts with.
    pub fn cipher(&self) -> CipherSpec {
        self.cipher
    }

    /// Encrypt `value` into an outer payload string.
    ///
    /// When `serialize` is set the value is passed through the serializer first.
    ///
    /// # Errors
    ///
    /// - [`CryptError::Serialization`] if the serializer rejects the value.
    /// - [`CryptError::Encryption`] if the cipher transform fails.
    /// - [`CryptError::Encoding`] if the payload cannot be encoded.
    pub fn encrypt(&self, value: &[u8], serialize: bool) -> Result<String, CryptError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.encrypt_with_iv(value, serialize, &iv)
    }

    pub(crate) fn encrypt_with_iv(
        &self,
        value: &[u8],
        serialize: bool,
        iv: &[u8; IV_LEN],
    ) -> Result<String, CryptError> {
        let serialized;
        let plaintext = if serialize {
            serialized = self.serializer.serialize(value)?;
            &serialized[..]
        } else {
            value
        };

        let value = cipher::encrypt(self.cipher, self.key.as_bytes(), iv, plaintext)?;
        let iv = STANDARD.encode(iv);
        let mac =
            mac::tag(self.key.as_bytes(), &iv, &value).map_err(|_| CryptError::Encryption)?;

        Payload { iv, value, mac }.encode()
    }

    /// Decrypt an outer payload string.
    ///
    /// The payload structure is validated before the MAC is checked, and the
    /// MAC is checked before anything is decrypted.
    ///
    /// # Errors
    ///
    /// - [`CryptError::Payload`] if the string is not a well-formed payload.
    /// - [`CryptError::Authentication`] if the MAC does not match.
    /// - [`CryptError::Decryption`] if the ciphertext cannot be decrypted.
    /// - [`CryptError::Serialization`] if `unserialize` is set and the
    ///   serializer rejects the plaintext.
    pub fn decrypt(&self, payload: &str, unserialize: bool) -> Result<Vec<u8>, CryptError> {
        let (payload, iv) = Payload::decode(payload, self.cipher)?;

        if !mac::verify(self.key.as_bytes(), &payload.iv, &payload.value, &payload.mac) {
            return Err(CryptError::Authentication);
        }

        let decrypted = cipher::decrypt(self.cipher, self.key.as_bytes(), &iv, &payload.value)?;

        if unserialize {
            self.serializer.deserialize(&decrypted)
        } else {
            Ok(decrypted)
        }
    }

    /// Encrypt a string without serialization.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedCodec::encrypt`].
    pub fn encrypt_string(&self, value: &str) -> Result<String, CryptError> {
        self.encrypt(value.as_bytes(), false)
    }

    /// Decrypt a payload without unserialization and return it as UTF-8 text.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedCodec::decrypt`]. Plaintext that is not valid UTF-8
    /// yields [`CryptError::Decryption`].
    pub fn decrypt_string(&self, payload: &str) -> Result<String, CryptError> {
        let bytes = self.decrypt(payload, false)?;
        String::from_utf8(bytes).map_err(|_| CryptError::Decryption)
    }
}

impl fmt::Debug for AuthenticatedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedCodec")
            .field("cipher", &self.cipher)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
