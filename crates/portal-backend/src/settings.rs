//! Machine-local settings: the admin flag and a runtime-chosen backend URL.
//!
//! These always live in the local store, even when data calls go remote.

use std::sync::Arc;

use portal_config::{AdminConfig, BackendConfig};
use portal_db::PortalDb;
use portal_db::repos::settings::{ADMIN_AUTHENTICATED, BACKEND_URL};

use crate::error::PortalError;

pub struct LocalSettings {
    db: Arc<PortalDb>,
}

/// Equal-length comparison that does not stop at the first mismatch.
fn passwords_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

impl LocalSettings {
    #[must_use]
    pub const fn new(db: Arc<PortalDb>) -> Self {
        Self { db }
    }

    /// The URL saved with `backend set`, if any.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the settings table cannot be read.
    pub async fn backend_url(&self) -> Result<Option<String>, PortalError> {
        Ok(self
            .db
            .get_setting(BACKEND_URL)
            .await?
            .filter(|url| !url.trim().is_empty()))
    }

    /// # Errors
    ///
    /// Returns `PortalError::Validation` if `url` is not an http(s) URL.
    pub async fn set_backend_url(&self, url: &str) -> Result<(), PortalError> {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PortalError::Validation(format!(
                "backend URL must be http(s), got '{url}'"
            )));
        }
        self.db.set_setting(BACKEND_URL, url).await?;
        tracing::info!(url, "backend URL saved");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PortalError` if the settings table cannot be written.
    pub async fn clear_backend_url(&self) -> Result<(), PortalError> {
        self.db.clear_setting(BACKEND_URL).await?;
        tracing::info!("backend URL cleared; using local store");
        Ok(())
    }

    /// The endpoint data calls should go to: the configured URL, else the
    /// saved one, else `None` for the local store.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the settings table cannot be read.
    pub async fn effective_backend_url(
        &self,
        config: &BackendConfig,
    ) -> Result<Option<String>, PortalError> {
        if config.is_configured() {
            return Ok(Some(config.url.trim().to_string()));
        }
        self.backend_url().await
    }

    /// # Errors
    ///
    /// Returns `PortalError` if the settings table cannot be read.
    pub async fn is_admin(&self) -> Result<bool, PortalError> {
        Ok(self.db.get_setting(ADMIN_AUTHENTICATED).await?.as_deref() == Some("true"))
    }

    /// # Errors
    ///
    /// Returns `PortalError::Unauthorized` unless an admin session is active.
    pub async fn require_admin(&self) -> Result<(), PortalError> {
        if self.is_admin().await? {
            Ok(())
        } else {
            Err(PortalError::Unauthorized(
                "admin login required (portal admin login)".into(),
            ))
        }
    }

    /// Start an admin session if `password` matches the configured one.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Unauthorized` if admin login is disabled or the
    /// password is wrong.
    pub async fn admin_login(&self, password: &str, admin: &AdminConfig) -> Result<(), PortalError> {
        if !admin.is_configured() {
            return Err(PortalError::Unauthorized(
                "admin login is disabled; set admin.password".into(),
            ));
        }
        if !passwords_match(password, &admin.password) {
            tracing::warn!("admin login failed");
            return Err(PortalError::Unauthorized("wrong admin password".into()));
        }
        self.db.set_setting(ADMIN_AUTHENTICATED, "true").await?;
        tracing::info!("admin session started");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `PortalError` if the settings table cannot be written.
    pub async fn admin_logout(&self) -> Result<(), PortalError> {
        self.db.clear_setting(ADMIN_AUTHENTICATED).await?;
        tracing::info!("admin session ended");
        Ok(())
    }
}
