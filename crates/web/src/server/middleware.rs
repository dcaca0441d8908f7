//! Request limits applied to the router.

use std::time::Duration;

use crate::config::Config;

/// Per-request timeout and body size limit.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl From<&Config> for Limits {
    fn from(cfg: &Config) -> Self {
        Self {
            request_timeout: cfg.request_timeout(),
            max_body_bytes: cfg.max_body_bytes,
        }
    }
}
