//! Status enums, proof types, and entity types for the portal.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ApplicationStatus
// ---------------------------------------------------------------------------

/// Review status of an application.
///
/// ```text
/// pending → approved → approved (re-trigger)
///         → rejected → rejected (re-trigger)
/// ```
///
/// Nothing moves back to `pending`, and the two terminal states never swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Approved],
            Self::Rejected => &[Self::Rejected],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = crate::errors::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(crate::errors::CoreError::Validation(format!(
                "unknown application status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ProofStatus
// ---------------------------------------------------------------------------

/// Review state of a single challenge proof.
///
/// Only `approved` is ever stored. A rejected proof is deleted together with
/// its status so the student sees an empty field to redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProofStatus {
    Approved,
}

impl ProofStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
        }
    }
}

impl fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProofType
// ---------------------------------------------------------------------------

/// Kind of proof a task or challenge asks for.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProofType {
    #[default]
    Text,
    Link,
    Image,
}

impl ProofType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Link => "link",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

/// Kind of a content link in the class config.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    #[default]
    Link,
    Video,
    Document,
    Repository,
    #[serde(other)]
    Other,
}

impl ResourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Video => "video",
            Self::Document => "document",
            Self::Repository => "repository",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in not-found and transition errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Application,
    InviteCode,
    Challenge,
    Blob,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::InviteCode => "invite_code",
            Self::Challenge => "challenge",
            Self::Blob => "blob",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        status_pending,
        ApplicationStatus,
        ApplicationStatus::Pending,
        "pending"
    );
    test_serde_roundtrip!(
        status_rejected,
        ApplicationStatus,
        ApplicationStatus::Rejected,
        "rejected"
    );
    test_serde_roundtrip!(proof_approved, ProofStatus, ProofStatus::Approved, "approved");
    test_serde_roundtrip!(proof_type_image, ProofType, ProofType::Image, "image");
    test_serde_roundtrip!(
        entity_invite_code,
        EntityType,
        EntityType::InviteCode,
        "invite_code"
    );

    #[test]
    fn pending_moves_to_either_terminal_state() {
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Approved));
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Pending));
    }

    #[test]
    fn terminal_states_only_retrigger_themselves() {
        assert!(ApplicationStatus::Approved.can_transition_to(ApplicationStatus::Approved));
        assert!(!ApplicationStatus::Approved.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Approved.can_transition_to(ApplicationStatus::Pending));
        assert!(ApplicationStatus::Rejected.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Rejected.can_transition_to(ApplicationStatus::Approved));
    }

    #[test]
    fn status_parses_from_wire_strings() {
        assert_eq!(
            "approved".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::Approved
        );
        assert!("archived".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn unknown_resource_kind_falls_back_to_other() {
        let kind: ResourceKind = serde_json::from_str("\"podcast\"").unwrap();
        assert_eq!(kind, ResourceKind::Other);
    }
}
