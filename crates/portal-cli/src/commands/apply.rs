use portal_core::entities::NewApplication;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ApplyArgs;
use crate::commands::shared::parse::parse_pairs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `portal apply`.
pub async fn handle(args: &ApplyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let submission = NewApplication {
        email: args.email.trim().to_string(),
        full_name: args.name.clone(),
        why_join: args.why.clone(),
        task_proofs: parse_pairs(&args.proof, "proof")?,
        wave: args.wave,
        quest_set_id: args.quest.clone(),
    };
    let app = ctx.portal.apply(submission).await?;
    output(&app, flags.format)
}
