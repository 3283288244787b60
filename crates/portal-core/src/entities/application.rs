use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::ProofValue;
use crate::enums::{ApplicationStatus, ProofStatus};

const fn default_wave() -> u32 {
    1
}

/// A submitted request for class access, pending admin review.
///
/// `id` is assigned at creation and never reassigned. `task_proofs` holds both
/// application-task proofs and, after approval, learning-challenge proofs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub why_join: String,
    #[serde(default)]
    pub task_proofs: BTreeMap<String, ProofValue>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(default = "default_wave")]
    pub wave: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_set_id: Option<String>,
    #[serde(default)]
    pub proof_statuses: BTreeMap<String, ProofStatus>,
}

impl Application {
    /// Build a fresh `pending` application from an already-validated
    /// submission whose proofs have been classified.
    #[must_use]
    pub fn from_submission(
        id: String,
        submission: NewApplication,
        task_proofs: BTreeMap<String, ProofValue>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: submission.email.trim().to_string(),
            full_name: submission.full_name.trim().to_string(),
            why_join: submission.why_join,
            task_proofs,
            status: ApplicationStatus::Pending,
            submitted_at,
            admin_note: None,
            wave: submission.wave.unwrap_or_else(default_wave),
            quest_set_id: submission.quest_set_id,
            proof_statuses: BTreeMap::new(),
        }
    }

    /// Whether the proof for `challenge_id` has been approved.
    #[must_use]
    pub fn is_proof_approved(&self, challenge_id: &str) -> bool {
        self.proof_statuses.get(challenge_id) == Some(&ProofStatus::Approved)
    }
}

/// Fields supplied by an applicant. The store assigns `id`, `status` and
/// `submittedAt`.
///
/// Proofs arrive as raw strings keyed by task id; they are classified against
/// the task's declared proof type at submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub email: String,
    pub full_name: String,
    pub why_join: String,
    #[serde(default)]
    pub task_proofs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quest_set_id: Option<String>,
}
