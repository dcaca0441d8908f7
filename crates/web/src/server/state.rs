//! Shared application state injected into every Axum handler.

use anyhow::Result;

use super::page::PageRenderer;

/// Application state shared across all request handlers.
///
/// Holds no key material: codecs are built per request from the submitted
/// key and dropped when the request completes.
#[derive(Clone)]
pub struct AppState {
    /// Compiled page template.
    pub renderer: PageRenderer,
}

impl AppState {
    /// Create a new [`AppState`], compiling the page template.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in template fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            renderer: PageRenderer::new()?,
        })
    }
}
