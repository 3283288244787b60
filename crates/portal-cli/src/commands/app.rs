use portal_backend::Backend;
use portal_core::enums::ApplicationStatus;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AppCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal app`.
pub async fn handle(action: &AppCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.require_admin().await?;

    match action {
        AppCommands::List { status } => {
            let status = status
                .as_deref()
                .map(|value| parse_enum::<ApplicationStatus>(value, "status"))
                .transpose()?;
            let mut apps = ctx.backend().list_applications().await?;
            if let Some(status) = status {
                apps.retain(|app| app.status == status);
            }
            output(&apps, flags.format)
        }
        AppCommands::Get { id } => {
            let app = ctx.backend().get_application(id).await?;
            output(&app, flags.format)
        }
        AppCommands::Approve { id } => {
            let code = ctx.portal.approve(id).await?;
            output(&json!({ "approved": id, "code": code }), flags.format)
        }
        AppCommands::Reject { id } => {
            ctx.portal.reject(id).await?;
            output(&json!({ "rejected": id }), flags.format)
        }
        AppCommands::ApproveBatch { ids } => {
            let report = ctx.portal.approve_batch(ids).await;
            output(&report, flags.format)?;
            if report.failed.is_empty() {
                Ok(())
            } else {
                anyhow::bail!(
                    "{} of {} approvals failed",
                    report.failed.len(),
                    ids.len()
                )
            }
        }
        AppCommands::Note { id, text, clear } => {
            let note = if *clear { None } else { text.clone() };
            ctx.portal.set_note(id, note.clone()).await?;
            output(&json!({ "id": id, "adminNote": note }), flags.format)
        }
    }
}
