//! Local store locations.

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".portal/portal.db".to_string()
}

fn default_outbox_path() -> String {
    ".portal/outbox.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file, or `:memory:`.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// JSONL file receiving every outbound email.
    #[serde(default = "default_outbox_path")]
    pub outbox_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            outbox_path: default_outbox_path(),
        }
    }
}

impl StoreConfig {
    pub fn is_in_memory(&self) -> bool {
        self.db_path == ":memory:"
    }
}
