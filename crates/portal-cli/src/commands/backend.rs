use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::BackendCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal backend`.
pub async fn handle(action: &BackendCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        BackendCommands::Show => {
            let saved = ctx.settings.backend_url().await?;
            output(
                &json!({
                    "mode": ctx.backend().mode(),
                    "endpoint": ctx.backend().endpoint(),
                    "configuredUrl": ctx.config.backend.is_configured().then_some(&ctx.config.backend.url),
                    "savedUrl": saved,
                    "storePath": ctx.config.store.db_path,
                }),
                flags.format,
            )
        }
        BackendCommands::Set { url } => {
            ctx.require_admin().await?;
            ctx.settings.set_backend_url(url).await?;
            if ctx.config.backend.is_configured() {
                tracing::warn!(
                    configured = %ctx.config.backend.url,
                    "backend.url in config takes precedence over the saved endpoint"
                );
            }
            output(&json!({ "savedUrl": url.trim() }), flags.format)
        }
        BackendCommands::Clear => {
            ctx.require_admin().await?;
            ctx.settings.clear_backend_url().await?;
            output(&json!({ "savedUrl": null }), flags.format)
        }
    }
}
