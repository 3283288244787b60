//! Outbound email settings.

use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

fn default_from() -> String {
    "class-portal@localhost".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// Whether code and reminder emails are written at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Sender address stamped on every email.
    #[serde(default = "default_from")]
    pub from: String,

    /// Portal link included in emails. Empty leaves it out.
    #[serde(default)]
    pub portal_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            from: default_from(),
            portal_url: String::new(),
        }
    }
}
