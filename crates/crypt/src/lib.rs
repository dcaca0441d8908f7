//! Illuminate-compatible authenticated encryption.
//!
//! Values are encrypted with AES-128-CBC or AES-256-CBC, tagged with
//! HMAC-SHA256 and framed as a transport string that Laravel's encrypter
//! reads and writes:
//!
//! ```text
//! base64( {"iv":"<base64 iv>","value":"<base64 ciphertext>","mac":"<hex hmac>"} )
//! ```
//!
//! ```
//! use illuminate_crypt::{AuthenticatedCodec, CipherSpec};
//!
//! let key = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
//! let codec = AuthenticatedCodec::new(CipherSpec::Aes256Cbc, key)?;
//! let payload = codec.encrypt_string("hello world")?;
//! assert_eq!(codec.decrypt_string(&payload)?, "hello world");
//! # Ok::<(), illuminate_crypt::CryptError>(())
//! ```

pub mod cipher;
pub mod codec;
pub mod error;
pub mod key;
mod mac;
pub mod payload;
pub mod serializer;

pub use cipher::CipherSpec;
pub use codec::AuthenticatedCodec;
pub use error::CryptError;
pub use key::SecretKey;
pub use payload::Payload;
pub use serializer::{PhpStringSerializer, ValueSerializer};
