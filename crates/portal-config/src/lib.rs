//! # portal-config
//!
//! Layered configuration loading for the class portal using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PORTAL_*` prefix, `__` as separator)
//! 2. Project-level `.portal/config.toml`
//! 3. User-level `~/.config/portal/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PORTAL_BACKEND__URL` -> `backend.url`,
//! `PORTAL_CODES__ALLOW_REPEATED_REDEMPTION` -> `codes.allow_repeated_redemption`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use portal_config::PortalConfig;
//!
//! let config = PortalConfig::load_with_dotenv().expect("config");
//!
//! if config.backend.is_configured() {
//!     println!("Remote endpoint: {}", config.backend.url);
//! }
//! ```

mod admin;
mod backend;
mod codes;
mod error;
mod mail;
mod reminders;
mod server;
mod store;

pub use admin::AdminConfig;
pub use backend::BackendConfig;
pub use codes::CodeConfig;
pub use error::ConfigError;
pub use mail::MailConfig;
pub use reminders::ReminderConfig;
pub use server::ServerConfig;
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub codes: CodeConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl PortalConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the CLI.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".portal/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("PORTAL_").split("__"))
    }

    /// Check cross-field constraints figment cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.codes.validate()?;
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("portal").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current
    /// directory. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
