//! The `Backend` trait: one typed method per wire action.
//!
//! [`crate::LocalBackend`] serves the methods from the libSQL store,
//! [`crate::RemoteBackend`] forwards them to a remote action endpoint, and
//! [`crate::ActiveBackend`] picks one at runtime. Call sites never know which.

use async_trait::async_trait;
use portal_core::entities::{Application, ClassConfig, InviteCode, NewApplication};
use portal_core::enums::{ApplicationStatus, EntityType};
use portal_core::updates::ApplicationUpdate;

use crate::error::PortalError;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Current class config, migrated to the current schema. Falls back to
    /// the built-in default when nothing was saved.
    async fn get_config(&self) -> Result<ClassConfig, PortalError>;

    /// Overwrite the class config wholesale.
    async fn update_config(&self, config: ClassConfig) -> Result<(), PortalError>;

    /// Validate and store a new `pending` application.
    async fn submit_application(
        &self,
        submission: NewApplication,
    ) -> Result<Application, PortalError>;

    async fn list_applications(&self) -> Result<Vec<Application>, PortalError>;

    /// # Errors
    ///
    /// Returns `PortalError::NotFound` if no application has this id.
    async fn get_application(&self, id: &str) -> Result<Application, PortalError> {
        self.list_applications()
            .await?
            .into_iter()
            .find(|app| app.id == id)
            .ok_or_else(|| PortalError::not_found(EntityType::Application, id))
    }

    /// Move an application through the status machine.
    async fn update_status(&self, id: &str, status: ApplicationStatus)
    -> Result<(), PortalError>;

    /// Shallow-merge fields into an application.
    async fn update_application(
        &self,
        id: &str,
        update: ApplicationUpdate,
    ) -> Result<(), PortalError>;

    /// Return the application's code, creating and emailing it on first call.
    async fn issue_code(&self, application_id: &str, email: &str)
    -> Result<InviteCode, PortalError>;

    async fn list_codes(&self) -> Result<Vec<InviteCode>, PortalError>;

    /// Whether `code` grants access. Marks it used.
    async fn redeem_code(&self, code: &str) -> Result<bool, PortalError>;

    /// Email upcoming-session reminders. Returns the number of emails sent.
    async fn trigger_reminders(&self) -> Result<u32, PortalError>;
}
