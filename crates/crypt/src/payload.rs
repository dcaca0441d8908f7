//! Payload framing: `base64(JSON{iv, value, mac})`.
//!
//! # Wire format
//!
//! ```text
//! base64( {"iv":"<base64 iv>","value":"<base64 ciphertext>","mac":"<hex hmac>"} )
//! ```
//!
//! The JSON is written the way PHP's `json_encode` writes it by default: no
//! whitespace, keys in the order above, and `/` escaped as `\/`. Any JSON
//! that decodes to the same object is accepted on the way in.

use base64::{
    alphabet,
    engine::{general_purpose::STANDARD, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::{Deserialize, Serialize};

use crate::cipher::CipherSpec;
use crate::error::CryptError;

/// Standard alphabet, padding optional on decode.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The three-field wire object carried inside the outer base64 envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Base64 of the random IV.
    pub iv: String,
    /// Base64 of the CBC ciphertext.
    pub value: String,
    /// Lowercase hex HMAC-SHA256 over `iv ‖ value`.
    pub mac: String,
}

impl Payload {
    /// Encode to the outer transport string.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::Encoding`] if JSON serialisation fails.
    pub fn encode(&self) -> Result<String, CryptError> {
        let json = serde_json::to_string(self).map_err(|_| CryptError::Encoding)?;
        Ok(STANDARD.encode(escape_slashes(&json)))
    }

    /// Decode an outer transport string into a structurally valid payload.
    ///
    /// Checks that the JSON is an object whose `iv`, `value` and `mac` fields
    /// are strings, and that `iv` decodes to `spec.iv_len()` bytes. Unknown
    /// fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CryptError::Payload`] on any decoding or structural failure.
    pub fn decode(input: &str, spec: CipherSpec) -> Result<(Self, Vec<u8>), CryptError> {
        let raw = LENIENT
            .decode(strip_whitespace(input))
            .map_err(|_| CryptError::Payload)?;

        let json: serde_json::Value =
            serde_json::from_slice(&raw).map_err(|_| CryptError::Payload)?;
        // A JSON array would otherwise deserialise positionally into the struct.
        if !json.is_object() {
            return Err(CryptError::Payload);
        }
        let payload: Payload = serde_json::from_value(json).map_err(|_| CryptError::Payload)?;

        let iv = LENIENT
            .decode(&payload.iv)
            .map_err(|_| CryptError::Payload)?;
        if iv.len() != spec.iv_len() {
            return Err(CryptError::Payload);
        }

        Ok((payload, iv))
    }
}

/// Drop ASCII whitespace anywhere in base64 text, so line-wrapped input
/// decodes the same as the unwrapped form.
pub(crate) fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// Escape `/` as `\/`, matching PHP's default `json_encode` output.
///
/// Only safe on JSON whose `/` characters all sit inside string literals,
/// which holds for every JSON document.
fn escape_slashes(json: &str) -> String {
    json.replace('/', "\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outer(json: &str) -> String {
        STANDARD.encode(json)
    }

    fn sample() -> Payload {
        Payload {
            iv: "+/8AAAAAAAAAAAAAAAAAAA==".into(),
            value: "xj115P3RkAuWuVjOq59kUw==".into(),
            mac: "5a71efb444571a9468ffda624e99ee254565f260eea1904be1f1a080bc08ee64".into(),
        }
    }

    #[test]
    fn encode_matches_php_json_encode() {
        let encoded = sample().encode().unwrap();
        let json = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"iv":"+\/8AAAAAAAAAAAAAAAAAAA==","value":"xj115P3RkAuWuVjOq59kUw==","mac":"5a71efb444571a9468ffda624e99ee254565f260eea1904be1f1a080bc08ee64"}"#
        );
    }

    #[test]
    fn decode_unescapes_and_returns_iv_bytes() {
        let encoded = sample().encode().unwrap();
        let (payload, iv) = Payload::decode(&encoded, CipherSpec::Aes256Cbc).unwrap();
        assert_eq!(payload, sample());
        assert_eq!(iv.len(), 16);
        assert_eq!(&iv[..2], &[0xfb, 0xff]);
    }

    #[test]
    fn decode_tolerates_whitespace_and_missing_padding() {
        let encoded = sample().encode().unwrap();
        let stripped = format!("  {}\n", encoded.trim_end_matches('='));
        assert!(Payload::decode(&stripped, CipherSpec::Aes128Cbc).is_ok());
    }

    #[test]
    fn decode_ignores_embedded_line_breaks() {
        let encoded = sample().encode().unwrap();
        let wrapped: String = encoded
            .as_bytes()
            .chunks(10)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\r\n\t ");
        let (payload, _) = Payload::decode(&wrapped, CipherSpec::Aes256Cbc).unwrap();
        assert_eq!(payload, sample());
    }

    #[test]
    fn strip_whitespace_removes_all_ascii_whitespace() {
        assert_eq!(strip_whitespace(" ab\r\ncd\t e\x0c"), "abcde");
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let json = r#"{"iv":"AAECAwQFBgcICQoLDA0ODw==","value":"v","mac":"m","tag":""}"#;
        assert!(Payload::decode(&outer(json), CipherSpec::Aes256Cbc).is_ok());
    }

    #[test]
    fn decode_rejects_missing_fields() {
        for json in [
            r#"{"value":"v","mac":"m"}"#,
            r#"{"iv":"AAECAwQFBgcICQoLDA0ODw==","mac":"m"}"#,
            r#"{"iv":"AAECAwQFBgcICQoLDA0ODw==","value":"v"}"#,
        ] {
            assert_eq!(
                Payload::decode(&outer(json), CipherSpec::Aes256Cbc),
                Err(CryptError::Payload),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn decode_rejects_wrong_types() {
        for json in [
            r#"{"iv":"AAECAwQFBgcICQoLDA0ODw==","value":1,"mac":"m"}"#,
            r#"{"iv":"AAECAwQFBgcICQoLDA0ODw==","value":"v","mac":null}"#,
            r#"["AAECAwQFBgcICQoLDA0ODw==","v","m"]"#,
            r#""just a string""#,
        ] {
            assert_eq!(
                Payload::decode(&outer(json), CipherSpec::Aes256Cbc),
                Err(CryptError::Payload),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn decode_rejects_wrong_iv_length() {
        let json = r#"{"iv":"AAECAwQFBgcICQoL","value":"v","mac":"m"}"#;
        assert_eq!(
            Payload::decode(&outer(json), CipherSpec::Aes256Cbc),
            Err(CryptError::Payload)
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(
            Payload::decode("%%% not base64 %%%", CipherSpec::Aes256Cbc),
            Err(CryptError::Payload)
        );
        assert_eq!(
            Payload::decode(&outer("not json"), CipherSpec::Aes256Cbc),
            Err(CryptError::Payload)
        );
        assert_eq!(
            Payload::decode("", CipherSpec::Aes256Cbc),
            Err(CryptError::Payload)
        );
    }
}
