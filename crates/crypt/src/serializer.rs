//! Structured serialization applied before encryption and after decryption.
//!
//! The codec only calls the serializer when the caller asks for it (the
//! `serialize` / `unserialize` flags). [`PhpStringSerializer`] is the default
//! and covers values written by Laravel's `encrypt($string)`.

use crate::error::CryptError;

/// Reversible encoding of a value into the bytes that get encrypted.
#[cfg_attr(test, mockall::automock)]
pub trait ValueSerializer: Send + Sync {
    /// Encode `value` before encryption.
    fn serialize(&self, value: &[u8]) -> Result<Vec<u8>, CryptError>;

    /// Decode decrypted bytes back into the original value.
    fn deserialize(&self, data: &[u8]) -> Result<Vec<u8>, CryptError>;
}

/// PHP `serialize()` format for strings: `s:<byte length>:"<bytes>";`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhpStringSerializer;

impl ValueSerializer for PhpStringSerializer {
    fn serialize(&self, value: &[u8]) -> Result<Vec<u8>, CryptError> {
        let header = format!("s:{}:\"", value.len());
        let mut out = Vec::with_capacity(header.len() + value.len() + 2);
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(value);
        out.extend_from_slice(b"\";");
        Ok(out)
    }

    fn deserialize(&self, data: &[u8]) -> Result<Vec<u8>, CryptError> {
        let invalid = || CryptError::Serialization("value is not a serialized PHP string".into());

        let rest = data.strip_prefix(b"s:").ok_or_else(invalid)?;
        let colon = rest.iter().position(|&b| b == b':').ok_or_else(invalid)?;
        let digits = &rest[..colon];
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }
        let len: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|d| d.parse().ok())
            .ok_or_else(invalid)?;

        let body = rest[colon + 1..]
            .strip_prefix(b"\"")
            .and_then(|b| b.strip_suffix(b"\";"))
            .ok_or_else(invalid)?;
        if body.len() != len {
            return Err(invalid());
        }
        Ok(body.to_vec())
    }
}
