use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AdminCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal admin`.
pub async fn handle(action: &AdminCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        AdminCommands::Login { password } => {
            ctx.settings.admin_login(password, &ctx.config.admin).await?;
            output(&json!({ "admin": true }), flags.format)
        }
        AdminCommands::Logout => {
            ctx.settings.admin_logout().await?;
            output(&json!({ "admin": false }), flags.format)
        }
    }
}
