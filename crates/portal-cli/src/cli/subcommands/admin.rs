use clap::Subcommand;

/// Admin session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AdminCommands {
    /// Unlock admin commands with the configured password.
    Login { password: String },
    /// Lock admin commands again.
    Logout,
}
