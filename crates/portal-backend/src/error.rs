//! The portal error taxonomy.
//!
//! Every crate-local error converges here before reaching a caller:
//! remote failures become [`PortalError::BackendUnavailable`], undecodable
//! stored rows become [`PortalError::CorruptRecord`], and bad input becomes
//! [`PortalError::Validation`].

use portal_config::ConfigError;
use portal_core::enums::EntityType;
use portal_core::errors::CoreError;
use portal_db::error::DatabaseError;
use portal_remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    /// The remote endpoint failed, timed out, or replied with something unreadable.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A referenced application, code, challenge or blob does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Locally stored data failed to decode.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Submitted fields are malformed or not acceptable in the current state.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A status change the state machine does not allow.
    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidTransition { id: String, from: String, to: String },

    /// Admin-only operation attempted without an admin session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The local store failed for a reason other than corrupt data.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PortalError {
    #[must_use]
    pub fn not_found(entity: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.as_str().to_string(),
            id: id.into(),
        }
    }

    /// Whether a `{success:false, message}` reply is the right wire shape for
    /// this error on acknowledgement-style actions.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::InvalidTransition { .. })
    }
}

impl From<RemoteError> for PortalError {
    fn from(err: RemoteError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}

impl From<DatabaseError> for PortalError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Corrupt { .. } => Self::CorruptRecord(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<CoreError> for PortalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity_type, id } => Self::NotFound {
                entity: entity_type,
                id,
            },
            CoreError::InvalidTransition { id, from, to, .. } => {
                Self::InvalidTransition { id, from, to }
            }
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Other(e) => Self::Storage(e.to_string()),
        }
    }
}

/// Map a store lookup miss to [`PortalError::NotFound`].
pub(crate) trait OrNotFound<T> {
    fn or_not_found(self, entity: EntityType, id: &str) -> Result<T, PortalError>;
}

impl<T> OrNotFound<T> for Result<T, DatabaseError> {
    fn or_not_found(self, entity: EntityType, id: &str) -> Result<T, PortalError> {
        self.map_err(|e| match e {
            DatabaseError::NoResult => PortalError::not_found(entity, id),
            other => other.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_are_backend_unavailable() {
        let err: PortalError = RemoteError::Timeout { secs: 10 }.into();
        assert!(matches!(err, PortalError::BackendUnavailable(ref m) if m.contains("10s")));

        let err: PortalError = RemoteError::Parse("reply is not JSON".into()).into();
        assert!(matches!(err, PortalError::BackendUnavailable(_)));
    }

    #[test]
    fn corrupt_rows_are_corrupt_records() {
        let err: PortalError = DatabaseError::Corrupt {
            table: "applications",
            id: "abc".into(),
            reason: "EOF".into(),
        }
        .into();
        assert!(matches!(err, PortalError::CorruptRecord(_)));
    }

    #[test]
    fn no_result_becomes_not_found() {
        let res: Result<(), DatabaseError> = Err(DatabaseError::NoResult);
        let err = res
            .or_not_found(EntityType::Application, "k3x9q0m2a")
            .unwrap_err();
        assert_eq!(err.to_string(), "application not found: k3x9q0m2a");
        assert!(err.is_refusal());
    }

    #[test]
    fn core_validation_stays_validation() {
        let err: PortalError = CoreError::Validation("fullName is required".into()).into();
        assert!(matches!(err, PortalError::Validation(_)));
        assert!(!err.is_refusal());
    }
}
