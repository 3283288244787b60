use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Apply(args) => commands::apply::handle(&args, ctx, flags).await,
        Commands::App { action } => commands::app::handle(&action, ctx, flags).await,
        Commands::Proof { action } => commands::proof::handle(&action, ctx, flags).await,
        Commands::Progress(args) => commands::proof::progress(&args.app_id, ctx, flags).await,
        Commands::Code { action } => commands::code::handle(&action, ctx, flags).await,
        Commands::Redeem(args) => commands::code::redeem(&args.code, ctx, flags).await,
        Commands::Config { action } => commands::config::handle(&action, ctx, flags).await,
        Commands::Reminders => commands::code::reminders(ctx, flags).await,
        Commands::Backend { action } => commands::backend::handle(&action, ctx, flags).await,
        Commands::Admin { action } => commands::admin::handle(&action, ctx, flags).await,
        Commands::Serve(_) => unreachable!("serve is pre-dispatched in main"),
    }
}
