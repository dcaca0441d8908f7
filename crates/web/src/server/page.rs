//! The HTML encryption/decryption tool.
//!
//! A request carries up to four parameters. When both the key size and the
//! secret key are present a codec is built; the source text (if any) is then
//! encrypted and the text for decryption (if any) decrypted, in that order.
//! The first failure stops processing and is shown on the page.

use std::sync::Arc;

use anyhow::{Context, Result};
use handlebars::{Handlebars, RenderError};
use illuminate_crypt::{AuthenticatedCodec, CipherSpec, CryptError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

const TEMPLATE_NAME: &str = "index";
const TEMPLATE: &str = include_str!("../../templates/index.hbs");

/// Form / query parameters of the tool page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolParams {
    pub key_size: Option<String>,
    pub secret_key: Option<String>,
    pub source_text: Option<String>,
    pub text_for_decryption: Option<String>,
}

/// Results shown on the page after processing a [`ToolParams`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ToolOutcome {
    pub encrypted: Option<String>,
    pub decrypted: Option<String>,
    pub error: Option<String>,
}

/// Run the encrypt/decrypt steps requested by `params`.
pub fn run_tool(params: &ToolParams) -> ToolOutcome {
    let mut outcome = ToolOutcome::default();

    let (Some(key_size), Some(secret_key)) =
        (non_empty(&params.key_size), non_empty(&params.secret_key))
    else {
        return outcome;
    };

    if let Err(e) = apply(key_size, secret_key, params, &mut outcome) {
        warn!(error_kind = e.kind(), "tool request failed");
        outcome.error = Some(e.to_string());
    }
    outcome
}

fn apply(
    key_size: &str,
    secret_key: &str,
    params: &ToolParams,
    outcome: &mut ToolOutcome,
) -> Result<(), CryptError> {
    let cipher = parse_key_size(key_size)?;
    let codec = AuthenticatedCodec::new(cipher, secret_key)?;

    if let Some(text) = non_empty(&params.source_text) {
        outcome.encrypted = Some(codec.encrypt_string(text)?);
        debug!(cipher = %cipher, input_len = text.len(), "encrypted source text");
    }

    if let Some(payload) = non_empty(&params.text_for_decryption) {
        let bytes = codec.decrypt(payload, false)?;
        debug!(cipher = %cipher, output_len = bytes.len(), "decrypted payload");
        outcome.decrypted = Some(String::from_utf8_lossy(&bytes).into_owned());
    }
    Ok(())
}

/// Parse a key size given as text (`"128"` or `"256"`).
///
/// # Errors
///
/// Returns [`CryptError::UnsupportedCipher`] for any other value.
pub fn parse_key_size(key_size: &str) -> Result<CipherSpec, CryptError> {
    let key_size = key_size.trim();
    let bits: u16 = key_size
        .parse()
        .map_err(|_| CryptError::UnsupportedCipher(format!("AES-{key_size}-CBC")))?;
    CipherSpec::from_key_size(bits)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Renders the tool page. Cheap to clone.
#[derive(Clone)]
pub struct PageRenderer {
    registry: Arc<Handlebars<'static>>,
}

impl PageRenderer {
    /// Compile the built-in page template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not parse.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry
            .register_template_string(TEMPLATE_NAME, TEMPLATE)
            .context("failed to compile page template")?;
        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    /// Render the page with the submitted parameters echoed back. All values
    /// are HTML-escaped.
    pub fn render(&self, params: &ToolParams, outcome: &ToolOutcome) -> Result<String, RenderError> {
        let key_size = params.key_size.as_deref().map(str::trim).unwrap_or_default();
        let data = json!({
            "key_size_128": key_size == "128",
            "key_size_256": key_size == "256",
            "secret_key": params.secret_key,
            "source_text": params.source_text,
            "text_for_decryption": params.text_for_decryption,
            "encrypted": outcome.encrypted,
            "decrypted": outcome.decrypted,
            "error": outcome.error,
        });
        self.registry.render(TEMPLATE_NAME, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_KEY_256: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

    fn params(source: Option<&str>, payload: Option<&str>) -> ToolParams {
        ToolParams {
            key_size: Some("256".into()),
            secret_key: Some(ZERO_KEY_256.into()),
            source_text: source.map(Into::into),
            text_for_decryption: payload.map(Into::into),
        }
    }

    #[test]
    fn nothing_happens_without_key() {
        let mut p = params(Some("hello"), None);
        p.secret_key = None;
        assert_eq!(run_tool(&p), ToolOutcome::default());
        p.secret_key = Some(String::new());
        assert_eq!(run_tool(&p), ToolOutcome::default());
    }

    #[test]
    fn encrypt_then_decrypt() {
        let encrypted = run_tool(&params(Some("hello world"), None))
            .encrypted
            .unwrap();
        let outcome = run_tool(&params(None, Some(&encrypted)));
        assert_eq!(outcome.decrypted.as_deref(), Some("hello world"));
        assert_eq!(outcome.error, None);
    }

    #[test]
    fn both_fields_processed_in_one_request() {
        let encrypted = run_tool(&params(Some("first"), None)).encrypted.unwrap();
        let outcome = run_tool(&params(Some("second"), Some(&encrypted)));
        assert!(outcome.encrypted.is_some());
        assert_eq!(outcome.decrypted.as_deref(), Some("first"));
    }

    #[test]
    fn decrypt_failure_keeps_encrypted_result() {
        let outcome = run_tool(&params(Some("kept"), Some("garbage")));
        assert!(outcome.encrypted.is_some());
        assert_eq!(outcome.decrypted, None);
        assert_eq!(outcome.error.as_deref(), Some("The payload is invalid."));
    }

    #[test]
    fn unsupported_key_size_is_reported() {
        let mut p = params(Some("x"), None);
        p.key_size = Some("192".into());
        let outcome = run_tool(&p);
        assert_eq!(outcome.encrypted, None);
        assert!(outcome.error.unwrap().contains("AES-192-CBC"));
    }

    #[test]
    fn short_key_is_reported() {
        let mut p = params(Some("x"), None);
        p.secret_key = Some("AAECAwQFBgcICQoLDA0ODw==".into());
        let outcome = run_tool(&p);
        assert!(outcome.error.unwrap().starts_with("invalid key"));
    }

    #[test]
    fn parse_key_size_values() {
        assert_eq!(parse_key_size(" 128 ").unwrap(), CipherSpec::Aes128Cbc);
        assert_eq!(parse_key_size("256").unwrap(), CipherSpec::Aes256Cbc);
        assert!(parse_key_size("abc").is_err());
    }

    #[test]
    fn render_escapes_values_and_selects_key_size() {
        let renderer = PageRenderer::new().unwrap();
        let p = ToolParams {
            key_size: Some("256".into()),
            secret_key: Some("<script>".into()),
            ..ToolParams::default()
        };
        let outcome = ToolOutcome {
            error: Some("bad \"input\"".into()),
            ..ToolOutcome::default()
        };
        let html = renderer.render(&p, &outcome).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("An error has occurred: bad &quot;input&quot;"));
        assert!(html.contains("<option selected>256</option>"));
        assert!(html.contains("<option>128</option>"));
    }

    #[test]
    fn render_without_error_has_no_alert() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render(&ToolParams::default(), &ToolOutcome::default())
            .unwrap();
        assert!(!html.contains("alert-danger"));
    }
}
