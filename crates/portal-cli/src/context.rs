use std::sync::Arc;

use anyhow::Context;
use portal_backend::{ActiveBackend, LocalSettings, Portal, open_store};
use portal_config::PortalConfig;

/// Shared resources initialized once at startup.
pub struct AppContext {
    pub config: PortalConfig,
    pub settings: LocalSettings,
    pub portal: Portal<ActiveBackend>,
}

impl AppContext {
    /// Open the local store and pick the backend for data calls.
    pub async fn init(config: PortalConfig) -> anyhow::Result<Self> {
        let db = Arc::new(
            open_store(&config.store)
                .await
                .with_context(|| format!("failed to open store at {}", config.store.db_path))?,
        );
        let settings = LocalSettings::new(Arc::clone(&db));
        let backend = ActiveBackend::from_config(&config, db)
            .await
            .context("failed to select backend")?;
        tracing::debug!(mode = backend.mode(), "backend selected");

        Ok(Self {
            config,
            settings,
            portal: Portal::new(backend),
        })
    }

    pub const fn backend(&self) -> &ActiveBackend {
        self.portal.backend()
    }

    /// Fail unless `portal admin login` succeeded on this machine.
    pub async fn require_admin(&self) -> anyhow::Result<()> {
        self.settings
            .require_admin()
            .await
            .context("run 'portal admin login <password>' first")
    }
}
