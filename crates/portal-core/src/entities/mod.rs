//! Entity structs for all portal domain objects.
//!
//! Each collection maps to a table in the local libSQL store and to a sheet
//! on the remote endpoint. All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema`; field names are camelCase on the wire.

mod application;
mod class_config;
mod invite_code;
mod proof;

pub use application::{Application, NewApplication};
pub use class_config::{
    ClassConfig, ClassResource, ClassSession, LearningChallenge, LearningModule, QuestSet,
    TaskConfig, CURRENT_SCHEMA_VERSION,
};
pub use invite_code::InviteCode;
pub use proof::ProofValue;
