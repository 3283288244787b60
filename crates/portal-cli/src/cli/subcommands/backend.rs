use clap::Subcommand;

/// Backend selection commands.
#[derive(Clone, Debug, Subcommand)]
pub enum BackendCommands {
    /// Show whether calls go to the local store or a remote endpoint.
    Show,
    /// Save a remote endpoint URL (admin).
    Set { url: String },
    /// Forget the saved endpoint and use the local store (admin).
    Clear,
}
