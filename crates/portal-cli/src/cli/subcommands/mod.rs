mod admin;
mod app;
mod backend;
mod code;
mod config;
mod proof;

pub use admin::AdminCommands;
pub use app::AppCommands;
pub use backend::BackendCommands;
pub use code::CodeCommands;
pub use config::ConfigCommands;
pub use proof::ProofCommands;
