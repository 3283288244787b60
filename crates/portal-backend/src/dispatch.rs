//! Wire dispatch: action name + JSON data in, JSON reply out.
//!
//! Each action marker from [`portal_core::actions`] implements [`Handler`],
//! binding its typed request to one [`Backend`] method. [`dispatch`] is
//! generated from the marker list as an exhaustive `match` on [`Action`], so
//! a new action without a handler fails to compile.

use async_trait::async_trait;
use portal_core::actions::{
    Action, ActionSpec, GenerateCode, GetApplications, GetCodes, GetConfig, SubmitApplication,
    TriggerReminders, UpdateApplication, UpdateConfig, UpdateStatus, UseCode,
};
use portal_core::responses::{Ack, RedeemResponse, RemindersResponse, SubmitResponse};
use serde_json::Value;

use crate::backend::Backend;
use crate::error::PortalError;

/// Serves one action against a backend.
#[async_trait]
pub trait Handler: ActionSpec {
    async fn handle(
        backend: &dyn Backend,
        request: Self::Request,
    ) -> Result<Self::Response, PortalError>;
}

/// Acknowledgement-style actions report refusals in the body.
fn ack(result: Result<(), PortalError>) -> Result<Ack, PortalError> {
    match result {
        Ok(()) => Ok(Ack::ok()),
        Err(e) if e.is_refusal() => Ok(Ack::failed(e.to_string())),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl Handler for GetConfig {
    async fn handle(backend: &dyn Backend, _: Self::Request) -> Result<Value, PortalError> {
        let config = backend.get_config().await?;
        serde_json::to_value(config).map_err(|e| PortalError::Storage(e.to_string()))
    }
}

#[async_trait]
impl Handler for UpdateConfig {
    async fn handle(backend: &dyn Backend, config: Self::Request) -> Result<Ack, PortalError> {
        backend.update_config(config).await?;
        Ok(Ack::ok())
    }
}

#[async_trait]
impl Handler for SubmitApplication {
    async fn handle(
        backend: &dyn Backend,
        submission: Self::Request,
    ) -> Result<SubmitResponse, PortalError> {
        let app = backend.submit_application(submission).await?;
        Ok(SubmitResponse { success: true, app })
    }
}

#[async_trait]
impl Handler for GetApplications {
    async fn handle(backend: &dyn Backend, _: Self::Request) -> Result<Self::Response, PortalError> {
        backend.list_applications().await
    }
}

#[async_trait]
impl Handler for UpdateStatus {
    async fn handle(backend: &dyn Backend, req: Self::Request) -> Result<Ack, PortalError> {
        ack(backend.update_status(&req.id, req.status).await)
    }
}

#[async_trait]
impl Handler for UpdateApplication {
    async fn handle(backend: &dyn Backend, req: Self::Request) -> Result<Ack, PortalError> {
        ack(backend.update_application(&req.id, req.fields).await)
    }
}

#[async_trait]
impl Handler for GenerateCode {
    async fn handle(backend: &dyn Backend, req: Self::Request) -> Result<Self::Response, PortalError> {
        backend.issue_code(&req.application_id, &req.email).await
    }
}

#[async_trait]
impl Handler for GetCodes {
    async fn handle(backend: &dyn Backend, _: Self::Request) -> Result<Self::Response, PortalError> {
        backend.list_codes().await
    }
}

#[async_trait]
impl Handler for UseCode {
    async fn handle(backend: &dyn Backend, req: Self::Request) -> Result<RedeemResponse, PortalError> {
        let valid = backend.redeem_code(&req.code).await?;
        Ok(RedeemResponse { valid })
    }
}

#[async_trait]
impl Handler for TriggerReminders {
    async fn handle(
        backend: &dyn Backend,
        _: Self::Request,
    ) -> Result<RemindersResponse, PortalError> {
        let sent = backend.trigger_reminders().await?;
        Ok(RemindersResponse { sent })
    }
}

async fn run<H: Handler>(backend: &dyn Backend, data: Value) -> Result<Value, PortalError> {
    // GET actions and bodiless POSTs carry no data.
    let data = if data.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        data
    };
    let request: H::Request = serde_json::from_value(data).map_err(|e| {
        PortalError::Validation(format!("bad data for {}: {e}", H::ACTION))
    })?;
    let response = H::handle(backend, request).await?;
    serde_json::to_value(response).map_err(|e| PortalError::Storage(e.to_string()))
}

macro_rules! dispatch_table {
    ($($marker:ident),+ $(,)?) => {
        /// Run `action` with raw JSON `data` against `backend`.
        ///
        /// # Errors
        ///
        /// Returns `PortalError::Validation` if `data` does not match the
        /// action's request type, or whatever the backend method returns.
        /// Refusals on acknowledgement actions are `Ok({success:false})`.
        pub async fn dispatch(
            backend: &dyn Backend,
            action: Action,
            data: Value,
        ) -> Result<Value, PortalError> {
            tracing::debug!(%action, "dispatching");
            match action {
                $( Action::$marker => run::<$marker>(backend, data).await, )+
            }
        }
    };
}

dispatch_table!(
    GetConfig,
    UpdateConfig,
    SubmitApplication,
    GetApplications,
    UpdateStatus,
    UpdateApplication,
    GenerateCode,
    GetCodes,
    UseCode,
    TriggerReminders,
);
