use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AdminCommands, AppCommands, BackendCommands, CodeCommands, ConfigCommands, ProofCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Submit an application.
    Apply(ApplyArgs),
    /// Review applications (admin).
    App {
        #[command(subcommand)]
        action: AppCommands,
    },
    /// Learning challenge proofs.
    Proof {
        #[command(subcommand)]
        action: ProofCommands,
    },
    /// XP and level of an admitted student.
    Progress(ProgressArgs),
    /// Invite codes (admin).
    Code {
        #[command(subcommand)]
        action: CodeCommands,
    },
    /// Redeem an invite code.
    Redeem(RedeemArgs),
    /// Class configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Email reminders for upcoming sessions (admin).
    Reminders,
    /// Remote endpoint selection.
    Backend {
        #[command(subcommand)]
        action: BackendCommands,
    },
    /// Admin session on this machine.
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
    /// Serve the action endpoint over the local store.
    Serve(ServeArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ApplyArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: String,
    /// Why the applicant wants to join.
    #[arg(long)]
    pub why: String,
    /// Task proof as `task_id=value`; repeat for each task. Image proofs take
    /// an image URL or a `data:image/...;base64,` URI.
    #[arg(long)]
    pub proof: Vec<String>,
    #[arg(long)]
    pub wave: Option<u32>,
    /// Apply to a quest set instead of the default class.
    #[arg(long)]
    pub quest: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ProgressArgs {
    pub app_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct RedeemArgs {
    pub code: String,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen address; defaults to `server.bind` from config.
    #[arg(long)]
    pub bind: Option<String>,
}
