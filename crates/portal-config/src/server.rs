//! Remote action endpoint (`portal serve`).

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address the endpoint listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// URL clients reach the endpoint at. Empty means the bound address.
    #[serde(default)]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: String::new(),
        }
    }
}
