use clap::Subcommand;

/// Application review commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AppCommands {
    /// List applications, newest first.
    List {
        /// Only applications with this status (pending, approved, rejected).
        #[arg(long)]
        status: Option<String>,
    },
    /// Get an application by ID.
    Get { id: String },
    /// Approve an application and email its invite code.
    Approve { id: String },
    /// Reject an application.
    Reject { id: String },
    /// Approve several applications; failures are reported, not rolled back.
    ApproveBatch {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Set or clear the admin note.
    Note {
        id: String,
        #[arg(long, conflicts_with = "clear", required_unless_present = "clear")]
        text: Option<String>,
        #[arg(long)]
        clear: bool,
    },
}
