//! Invite code policy.

use portal_core::ids::{DEFAULT_CODE_PREFIX, DEFAULT_CODE_SUFFIX_LEN};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_prefix() -> String {
    DEFAULT_CODE_PREFIX.to_string()
}

const fn default_suffix_len() -> usize {
    DEFAULT_CODE_SUFFIX_LEN
}

const fn default_allow_repeated_redemption() -> bool {
    true
}

const fn default_max_generation_attempts() -> u32 {
    8
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodeConfig {
    /// Fixed tag in front of every code (`TCP` gives `TCP-XXXXXX`).
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Number of random characters after the dash.
    #[serde(default = "default_suffix_len")]
    pub suffix_len: usize,

    /// Keep accepting a code after its first redemption, so one student can
    /// log in from several devices.
    #[serde(default = "default_allow_repeated_redemption")]
    pub allow_repeated_redemption: bool,

    /// Attempts at drawing a code not already in the collection.
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            suffix_len: default_suffix_len(),
            allow_repeated_redemption: default_allow_repeated_redemption(),
            max_generation_attempts: default_max_generation_attempts(),
        }
    }
}

impl CodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() || !self.prefix.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidValue {
                field: "codes.prefix".into(),
                reason: "must be non-empty ASCII alphanumerics".into(),
            });
        }
        if !(4..=16).contains(&self.suffix_len) {
            return Err(ConfigError::InvalidValue {
                field: "codes.suffix_len".into(),
                reason: "must be between 4 and 16".into(),
            });
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "codes.max_generation_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
