use anyhow::Context;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProofCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal proof`.
pub async fn handle(action: &ProofCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ProofCommands::Submit {
            app_id,
            challenge_id,
            value,
        } => {
            let proof = ctx.portal.submit_proof(app_id, challenge_id, value).await?;
            output(
                &json!({ "applicationId": app_id, "challengeId": challenge_id, "proof": proof }),
                flags.format,
            )
        }
        ProofCommands::Approve {
            app_id,
            challenge_id,
        } => {
            ctx.require_admin().await?;
            ctx.portal.approve_proof(app_id, challenge_id).await?;
            progress(app_id, ctx, flags).await
        }
        ProofCommands::Reject {
            app_id,
            challenge_id,
        } => {
            ctx.require_admin().await?;
            ctx.portal.reject_proof(app_id, challenge_id).await?;
            output(
                &json!({ "applicationId": app_id, "challengeId": challenge_id, "rejected": true }),
                flags.format,
            )
        }
        ProofCommands::Image { blob_id, out } => {
            ctx.require_admin().await?;
            let Some(local) = ctx.backend().as_local() else {
                anyhow::bail!("in remote mode image proofs are hosted by the endpoint; open the proof's URL instead");
            };
            let blob = local.get_blob(blob_id).await?;
            tokio::fs::write(out, &blob.data)
                .await
                .with_context(|| format!("failed to write {out}"))?;
            output(
                &json!({ "blobId": blob_id, "mime": blob.mime, "bytes": blob.data.len(), "path": out }),
                flags.format,
            )
        }
    }
}

/// Handle `portal progress`.
pub async fn progress(app_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.portal.progress(app_id).await?;
    output(&report, flags.format)
}
