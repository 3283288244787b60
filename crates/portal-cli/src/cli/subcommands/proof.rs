use clap::Subcommand;

/// Learning challenge proof commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProofCommands {
    /// Submit or resubmit a proof for a challenge.
    Submit {
        app_id: String,
        challenge_id: String,
        value: String,
    },
    /// Approve a submitted proof (admin).
    Approve { app_id: String, challenge_id: String },
    /// Reject a submitted proof so it can be redone (admin).
    Reject { app_id: String, challenge_id: String },
    /// Save a stored image proof, by blob id or hosted URL, to a file (admin, local store only).
    Image {
        blob_id: String,
        #[arg(long)]
        out: String,
    },
}
