use anyhow::Context;
use portal_backend::Backend;
use portal_core::migration::migrate_config;
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConfigCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal config`.
pub async fn handle(action: &ConfigCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = ctx.backend().get_config().await?;
            output(&config, flags.format)
        }
        ConfigCommands::Set { file } => {
            ctx.require_admin().await?;
            let text = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("failed to read {file}"))?;
            let raw: Value =
                serde_json::from_str(&text).with_context(|| format!("{file} is not valid JSON"))?;
            let config = migrate_config(raw).with_context(|| format!("{file} is not a class config"))?;
            ctx.backend().update_config(config.clone()).await?;
            output(&config, flags.format)
        }
        ConfigCommands::Reset => {
            ctx.require_admin().await?;
            let config = ctx.portal.reset_config().await?;
            output(&config, flags.format)
        }
    }
}
