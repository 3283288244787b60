//! Backend selection: local store or remote action endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default remote call timeout in seconds.
const fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Remote action endpoint (e.g. a deployed spreadsheet script).
    /// Empty means the local store is used.
    #[serde(default)]
    pub url: String,

    /// Upper bound on every remote call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Whether a remote endpoint is configured.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the URL scheme and timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "backend.url".into(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
