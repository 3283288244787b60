//! Admin console access.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    /// Shared admin password. Empty disables admin login.
    #[serde(default)]
    pub password: String,
}

impl AdminConfig {
    pub fn is_configured(&self) -> bool {
        !self.password.is_empty()
    }
}
