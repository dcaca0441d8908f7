//! HMAC-SHA256 payload tags and their verification.
//!
//! The tag is `hex(HMAC-SHA256(key, iv ‖ value))`, where `iv` is the base64
//! text of the IV exactly as it appears in the payload.
//!
//! Verification does not compare the stored tag with the recomputed one
//! directly. Both are first MACed again under 16 fresh random bytes and the
//! two results are compared in constant time with [`subtle`]. This is the
//! scheme used by the Illuminate encrypter and is kept as-is, so that the
//! comparison never involves attacker-chosen bytes against a secret-derived
//! value, whatever the length or content of the stored tag.

use hmac::{digest::InvalidLength, Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length of the random key used for a single verification.
const VERIFY_KEY_LEN: usize = 16;

/// Compute the hex tag for the base64 IV text and the ciphertext text.
pub(crate) fn tag(key: &[u8], iv_b64: &str, value: &str) -> Result<String, InvalidLength> {
    hmac_sha256(key, &[iv_b64.as_bytes(), value.as_bytes()]).map(hex::encode)
}

/// Check `stored_mac` against the tag recomputed from `iv_b64` and `value`.
pub(crate) fn verify(key: &[u8], iv_b64: &str, value: &str, stored_mac: &str) -> bool {
    let mut bytes = [0u8; VERIFY_KEY_LEN];
    OsRng.fill_bytes(&mut bytes);

    let Ok(expected) = tag(key, iv_b64, value) else {
        return false;
    };
    match (
        hmac_sha256(&bytes, &[expected.as_bytes()]),
        hmac_sha256(&bytes, &[stored_mac.as_bytes()]),
    ) {
        (Ok(calculated), Ok(presented)) => presented[..].ct_eq(&calculated[..]).into(),
        _ => false,
    }
}

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 32], InvalidLength> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IV: &str = "AAECAwQFBgcICQoLDA0ODw==";
    const VALUE: &str = "wOQqJiKvm9mIYlpkl2+psA==";
    const MAC: &str = "cd5cb5acf7177867ca25d38e94566d077efcb5bc938ef6168d0098911aa67d01";

    #[test]
    fn tag_matches_reference() {
        assert_eq!(tag(&[0u8; 32], IV, VALUE).unwrap(), MAC);
    }

    #[test]
    fn tag_accepts_empty_and_long_keys() {
        assert_eq!(tag(&[], IV, VALUE).unwrap().len(), 64);
        assert_eq!(tag(&[0u8; 200], IV, VALUE).unwrap().len(), 64);
    }

    #[test]
    fn tag_is_lowercase_hex() {
        let t = tag(b"k", "iv", "value").unwrap();
        assert_eq!(t.len(), 64);
        assert!(t.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn verify_accepts_matching_tag() {
        assert!(verify(&[0u8; 32], IV, VALUE, MAC));
    }

    #[test]
    fn verify_rejects_altered_tag() {
        let mut altered = MAC.to_owned();
        altered.pop();
        altered.push('0');
        assert!(!verify(&[0u8; 32], IV, VALUE, &altered));
        assert!(!verify(&[0u8; 32], IV, VALUE, ""));
        assert!(!verify(&[0u8; 32], IV, VALUE, &MAC.to_uppercase()));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        assert!(!verify(&[1u8; 32], IV, VALUE, MAC));
    }
}
