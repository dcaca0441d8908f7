//! Cipher selection and the AES-CBC block-cipher transform.
//!
//! The transform mirrors OpenSSL's text mode: encryption pads with PKCS#7 and
//! returns the ciphertext as standard base64, decryption accepts that base64
//! text directly. The `value` field of a payload is exactly this text.

use std::fmt;
use std::str::FromStr;

use aes::{Aes128, Aes256};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::error::CryptError;

/// Byte length of an AES-CBC initialisation vector, for every key size.
pub const IV_LEN: usize = 16;

/// Block cipher used by a codec: AES in CBC mode with a 128 or 256 bit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherSpec {
    /// `AES-128-CBC`, 16-byte key.
    Aes128Cbc,
    /// `AES-256-CBC`, 32-byte key.
    Aes256Cbc,
}

impl CipherSpec {
    /// Select the cipher from a key size in bits.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::UnsupportedCipher`] for anything other than 128 or 256.
    pub fn from_key_size(bits: u16) -> Result<Self, CryptError> {
        match bits {
            128 => Ok(CipherSpec::Aes128Cbc),
            256 => Ok(CipherSpec::Aes256Cbc),
            other => Err(CryptError::UnsupportedCipher(format!("AES-{other}-CBC"))),
        }
    }

    /// Key size in bits.
    pub fn key_bits(self) -> u16 {
        match self {
            CipherSpec::Aes128Cbc => 128,
            CipherSpec::Aes256Cbc => 256,
        }
    }

    /// Required raw key length in bytes.
    pub fn key_len(self) -> usize {
        usize::from(self.key_bits() / 8)
    }

    /// Required IV length in bytes.
    pub fn iv_len(self) -> usize {
        IV_LEN
    }

    /// OpenSSL-style identifier, e.g. `"AES-256-CBC"`.
    pub fn identifier(self) -> &'static str {
        match self {
            CipherSpec::Aes128Cbc => "AES-128-CBC",
            CipherSpec::Aes256Cbc => "AES-256-CBC",
        }
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for CipherSpec {
    type Err = CryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AES-128-CBC" => Ok(CipherSpec::Aes128Cbc),
            "AES-256-CBC" => Ok(CipherSpec::Aes256Cbc),
            _ => Err(CryptError::UnsupportedCipher(s.to_owned())),
        }
    }
}

/// Encrypt `plaintext` under `(key, iv)` and return the base64 ciphertext.
///
/// # Errors
///
/// Returns [`CryptError::Encryption`] if the key or IV length does not fit the cipher.
pub(crate) fn encrypt(
    spec: CipherSpec,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<String, CryptError> {
    let ciphertext = match spec {
        CipherSpec::Aes128Cbc => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| CryptError::Encryption)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        CipherSpec::Aes256Cbc => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| CryptError::Encryption)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypt the base64 ciphertext `value` under `(key, iv)`.
///
/// # Errors
///
/// Returns [`CryptError::Decryption`] if `value` is not base64, the key or IV
/// length is wrong, or the PKCS#7 padding is invalid.
pub(crate) fn decrypt(
    spec: CipherSpec,
    key: &[u8],
    iv: &[u8],
    value: &str,
) -> Result<Vec<u8>, CryptError> {
    let ciphertext = STANDARD
        .decode(value)
        .map_err(|_| CryptError::Decryption)?;

    let plaintext = match spec {
        CipherSpec::Aes128Cbc => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| CryptError::Decryption)?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
        CipherSpec::Aes256Cbc => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| CryptError::Decryption)?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext),
    };
    plaintext.map_err(|_| CryptError::Decryption)
}
