use portal_backend::Backend;
use portal_core::ids::normalize_code;
use portal_core::responses::{RedeemResponse, RemindersResponse};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CodeCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal code`.
pub async fn handle(action: &CodeCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.require_admin().await?;

    match action {
        CodeCommands::List => {
            let codes = ctx.backend().list_codes().await?;
            output(&codes, flags.format)
        }
        CodeCommands::Issue { app_id, email } => {
            let email = match email {
                Some(email) => email.clone(),
                None => ctx.backend().get_application(app_id).await?.email,
            };
            let code = ctx.backend().issue_code(app_id, &email).await?;
            output(&code, flags.format)
        }
    }
}

/// Handle `portal redeem`.
pub async fn redeem(code: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let valid = ctx.backend().redeem_code(&normalize_code(code)).await?;
    output(&RedeemResponse { valid }, flags.format)
}

/// Handle `portal reminders`.
pub async fn reminders(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.require_admin().await?;
    let sent = ctx.backend().trigger_reminders().await?;
    output(&RemindersResponse { sent }, flags.format)
}
