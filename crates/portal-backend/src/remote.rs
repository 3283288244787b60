//! Backend forwarding every call to a remote action endpoint.
//!
//! Any transport, status or decoding failure surfaces as
//! `PortalError::BackendUnavailable`. Nothing is retried or cached.

use std::time::Duration;

use async_trait::async_trait;
use portal_core::actions::{
    GenerateCode, GenerateCodeRequest, GetApplications, GetCodes, GetConfig, NoData,
    StatusUpdateRequest, SubmitApplication, TriggerReminders, UpdateApplication,
    UpdateApplicationRequest, UpdateConfig, UseCode, UseCodeRequest, UpdateStatus,
};
use portal_core::entities::{Application, ClassConfig, InviteCode, NewApplication};
use portal_core::enums::{ApplicationStatus, EntityType};
use portal_core::migration::migrate_config;
use portal_core::responses::Ack;
use portal_core::updates::ApplicationUpdate;
use portal_remote::RemoteClient;

use crate::backend::Backend;
use crate::error::PortalError;

pub struct RemoteBackend {
    client: RemoteClient,
}

impl RemoteBackend {
    /// # Errors
    ///
    /// Returns `PortalError::BackendUnavailable` if the endpoint URL is unusable.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, PortalError> {
        Ok(Self {
            client: RemoteClient::new(endpoint, timeout)?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

/// Re-type proofs read back as bare strings using the declared proof types.
fn retype_proofs(app: &mut Application, config: &ClassConfig) {
    let proofs = std::mem::take(&mut app.task_proofs);
    app.task_proofs = proofs
        .into_iter()
        .map(|(key, value)| {
            let value = match config.declared_proof_type(app.quest_set_id.as_deref(), &key) {
                Some(declared) => value.retyped(declared),
                None => value,
            };
            (key, value)
        })
        .collect();
}

/// Turn a `{success:false, message}` reply into an error.
fn ack_result(ack: Ack, id: &str) -> Result<(), PortalError> {
    if ack.success {
        return Ok(());
    }
    let message = ack.message.unwrap_or_else(|| "request refused".to_string());
    if message.to_ascii_lowercase().contains("not found") {
        Err(PortalError::not_found(EntityType::Application, id))
    } else {
        Err(PortalError::Validation(message))
    }
}

#[async_trait]
impl Backend for RemoteBackend {
    async fn get_config(&self) -> Result<ClassConfig, PortalError> {
        let raw = self.client.call::<GetConfig>(&NoData {}).await?;
        migrate_config(raw)
            .map_err(|e| PortalError::BackendUnavailable(format!("remote config unreadable: {e}")))
    }

    async fn update_config(&self, config: ClassConfig) -> Result<(), PortalError> {
        let ack = self.client.call::<UpdateConfig>(&config).await?;
        if !ack.success {
            return Err(PortalError::Validation(
                ack.message.unwrap_or_else(|| "config rejected".into()),
            ));
        }
        tracing::info!(endpoint = %self.endpoint(), "class config saved remotely");
        Ok(())
    }

    async fn submit_application(
        &self,
        submission: NewApplication,
    ) -> Result<Application, PortalError> {
        let reply = self.client.call::<SubmitApplication>(&submission).await?;
        if !reply.success {
            return Err(PortalError::Validation("submission rejected".into()));
        }
        let mut app = reply.app;
        let config = self.get_config().await?;
        retype_proofs(&mut app, &config);
        tracing::info!(id = %app.id, "application submitted remotely");
        Ok(app)
    }

    async fn list_applications(&self) -> Result<Vec<Application>, PortalError> {
        let mut apps = self.client.call::<GetApplications>(&NoData {}).await?;
        let config = self.get_config().await?;
        for app in &mut apps {
            retype_proofs(app, &config);
        }
        Ok(apps)
    }

    async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), PortalError> {
        let ack = self
            .client
            .call::<UpdateStatus>(&StatusUpdateRequest {
                id: id.to_string(),
                status,
            })
            .await?;
        ack_result(ack, id)?;
        tracing::info!(id, %status, "application status changed remotely");
        Ok(())
    }

    async fn update_application(
        &self,
        id: &str,
        update: ApplicationUpdate,
    ) -> Result<(), PortalError> {
        let ack = self
            .client
            .call::<UpdateApplication>(&UpdateApplicationRequest {
                id: id.to_string(),
                fields: update,
            })
            .await?;
        ack_result(ack, id)
    }

    async fn issue_code(
        &self,
        application_id: &str,
        email: &str,
    ) -> Result<InviteCode, PortalError> {
        let code = self
            .client
            .call::<GenerateCode>(&GenerateCodeRequest {
                application_id: application_id.to_string(),
                email: email.to_string(),
            })
            .await?;
        tracing::info!(application_id, code = %code.code, "invite code issued remotely");
        Ok(code)
    }

    async fn list_codes(&self) -> Result<Vec<InviteCode>, PortalError> {
        Ok(self.client.call::<GetCodes>(&NoData {}).await?)
    }

    async fn redeem_code(&self, code: &str) -> Result<bool, PortalError> {
        let reply = self
            .client
            .call::<UseCode>(&UseCodeRequest {
                code: portal_core::ids::normalize_code(code),
            })
            .await?;
        Ok(reply.valid)
    }

    async fn trigger_reminders(&self) -> Result<u32, PortalError> {
        Ok(self.client.call::<TriggerReminders>(&NoData {}).await?.sent)
    }
}
