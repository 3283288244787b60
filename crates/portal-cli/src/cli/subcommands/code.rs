use clap::Subcommand;

/// Invite code commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CodeCommands {
    /// List issued codes.
    List,
    /// Issue (or re-send) the code for an application.
    Issue {
        app_id: String,
        /// Recipient; defaults to the application's email.
        #[arg(long)]
        email: Option<String>,
    },
}
