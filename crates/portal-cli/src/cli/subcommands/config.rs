use clap::Subcommand;

/// Class configuration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the class config.
    Show,
    /// Replace the class config with a JSON document (admin).
    Set {
        /// Path to the JSON file. Older document versions are upgraded.
        file: String,
    },
    /// Restore the built-in default config (admin).
    Reset,
}
