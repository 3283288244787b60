//! Cross-cutting error types for the portal.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `RemoteError`) are defined in
//! their respective crates. They converge into `PortalError` in `portal-backend`.

use thiserror::Error;

/// Errors that can be raised by any portal crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints, unknown references).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
