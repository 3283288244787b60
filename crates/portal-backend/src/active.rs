//! Runtime choice between the local store and a remote endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use portal_config::PortalConfig;
use portal_core::entities::{Application, ClassConfig, InviteCode, NewApplication};
use portal_core::enums::ApplicationStatus;
use portal_core::updates::ApplicationUpdate;
use portal_db::PortalDb;

use crate::backend::Backend;
use crate::error::PortalError;
use crate::local::{LocalBackend, mailer_from_config};
use crate::mailer::Mailer;
use crate::remote::RemoteBackend;
use crate::settings::LocalSettings;

pub enum ActiveBackend {
    Local(LocalBackend),
    Remote(RemoteBackend),
}

impl ActiveBackend {
    /// Pick the backend: remote if an endpoint URL is configured or saved,
    /// else the local store in `db`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if settings cannot be read or the URL is unusable.
    pub async fn select(
        config: &PortalConfig,
        db: Arc<PortalDb>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, PortalError> {
        let settings = LocalSettings::new(Arc::clone(&db));
        match settings.effective_backend_url(&config.backend).await? {
            Some(url) => {
                tracing::debug!(%url, "using remote backend");
                Ok(Self::Remote(RemoteBackend::new(&url, config.backend.timeout())?))
            }
            None => {
                tracing::debug!(path = %config.store.db_path, "using local backend");
                Ok(Self::Local(LocalBackend::new(db, mailer, config)))
            }
        }
    }

    /// [`Self::select`] with the mailer described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the outbox cannot be created or selection fails.
    pub async fn from_config(config: &PortalConfig, db: Arc<PortalDb>) -> Result<Self, PortalError> {
        Self::select(config, db, mailer_from_config(config)?).await
    }

    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
        }
    }

    /// Remote endpoint URL, or `None` in local mode.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Local(_) => None,
            Self::Remote(remote) => Some(remote.endpoint()),
        }
    }

    #[must_use]
    pub const fn as_local(&self) -> Option<&LocalBackend> {
        match self {
            Self::Local(local) => Some(local),
            Self::Remote(_) => None,
        }
    }

    fn inner(&self) -> &dyn Backend {
        match self {
            Self::Local(local) => local,
            Self::Remote(remote) => remote,
        }
    }
}

#[async_trait]
impl Backend for ActiveBackend {
    async fn get_config(&self) -> Result<ClassConfig, PortalError> {
        self.inner().get_config().await
    }

    async fn update_config(&self, config: ClassConfig) -> Result<(), PortalError> {
        self.inner().update_config(config).await
    }

    async fn submit_application(
        &self,
        submission: NewApplication,
    ) -> Result<Application, PortalError> {
        self.inner().submit_application(submission).await
    }

    async fn list_applications(&self) -> Result<Vec<Application>, PortalError> {
        self.inner().list_applications().await
    }

    async fn get_application(&self, id: &str) -> Result<Application, PortalError> {
        self.inner().get_application(id).await
    }

    async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), PortalError> {
        self.inner().update_status(id, status).await
    }

    async fn update_application(
        &self,
        id: &str,
        update: ApplicationUpdate,
    ) -> Result<(), PortalError> {
        self.inner().update_application(id, update).await
    }

    async fn issue_code(
        &self,
        application_id: &str,
        email: &str,
    ) -> Result<InviteCode, PortalError> {
        self.inner().issue_code(application_id, email).await
    }

    async fn list_codes(&self) -> Result<Vec<InviteCode>, PortalError> {
        self.inner().list_codes().await
    }

    async fn redeem_code(&self, code: &str) -> Result<bool, PortalError> {
        self.inner().redeem_code(code).await
    }

    async fn trigger_reminders(&self) -> Result<u32, PortalError> {
        self.inner().trigger_reminders().await
    }
}
