//! Application update builder.
//!
//! An update is a shallow field merge: every `Some` field replaces the stored
//! value wholesale, including the proof maps. Per-challenge proof changes go
//! through [`ProofPatch`] instead, so they touch one key of the freshly read
//! record and never overwrite a concurrent change to another key.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{Application, ProofValue};
use crate::enums::{ApplicationStatus, ProofStatus};
use crate::errors::CoreError;

/// A change to one challenge's proof and review.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProofPatch {
    /// Store (or replace) the proof and clear any earlier review.
    Submit { proof: ProofValue },
    /// Mark the stored proof approved.
    Approve,
    /// Delete the stored proof and its review.
    Reject,
}

impl ProofPatch {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a proof is submitted for an
    /// application that is not approved, or a review targets a challenge with
    /// no stored proof.
    pub fn apply_to(self, key: &str, app: &mut Application) -> Result<(), CoreError> {
        match self {
            Self::Submit { proof } => {
                if app.status != ApplicationStatus::Approved {
                    return Err(CoreError::Validation(format!(
                        "application {} is {}; only admitted students submit proofs",
                        app.id, app.status
                    )));
                }
                app.task_proofs.insert(key.to_string(), proof);
                app.proof_statuses.remove(key);
            }
            Self::Approve => {
                if !app.task_proofs.contains_key(key) {
                    return Err(missing_proof(&app.id, key));
                }
                app.proof_statuses
                    .insert(key.to_string(), ProofStatus::Approved);
            }
            Self::Reject => {
                if app.task_proofs.remove(key).is_none() {
                    return Err(missing_proof(&app.id, key));
                }
                app.proof_statuses.remove(key);
            }
        }
        Ok(())
    }
}

fn missing_proof(app_id: &str, key: &str) -> CoreError {
    CoreError::Validation(format!(
        "application {app_id} has no proof for challenge {key}"
    ))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_join: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub admin_note: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_or_null"
    )]
    pub quest_set_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_proofs: Option<BTreeMap<String, ProofValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_statuses: Option<BTreeMap<String, ProofStatus>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_patches: Option<BTreeMap<String, ProofPatch>>,
}

/// A present key (even `null`) is `Some`; an absent key falls back to `None`
/// through `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ApplicationUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge this update into `app`. `id`, `status` and `submittedAt` are
    /// never touched. Proof patches apply after the wholesale fields.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a proof patch is refused; `app` may
    /// then be partly updated and should be discarded.
    pub fn apply_to(self, app: &mut Application) -> Result<(), CoreError> {
        if let Some(email) = self.email {
            app.email = email;
        }
        if let Some(full_name) = self.full_name {
            app.full_name = full_name;
        }
        if let Some(why_join) = self.why_join {
            app.why_join = why_join;
        }
        if let Some(admin_note) = self.admin_note {
            app.admin_note = admin_note;
        }
        if let Some(wave) = self.wave {
            app.wave = wave;
        }
        if let Some(quest_set_id) = self.quest_set_id {
            app.quest_set_id = quest_set_id;
        }
        if let Some(task_proofs) = self.task_proofs {
            app.task_proofs = task_proofs;
        }
        if let Some(proof_statuses) = self.proof_statuses {
            app.proof_statuses = proof_statuses;
        }
        for (key, patch) in self.proof_patches.into_iter().flatten() {
            patch.apply_to(&key, app)?;
        }
        Ok(())
    }
}

pub struct ApplicationUpdateBuilder(ApplicationUpdate);

impl Default for ApplicationUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ApplicationUpdate::default())
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.0.full_name = Some(full_name.into());
        self
    }

    #[must_use]
    pub fn why_join(mut self, why_join: impl Into<String>) -> Self {
        self.0.why_join = Some(why_join.into());
        self
    }

    #[must_use]
    pub fn admin_note(mut self, admin_note: Option<String>) -> Self {
        self.0.admin_note = Some(admin_note);
        self
    }

    #[must_use]
    pub fn wave(mut self, wave: u32) -> Self {
        self.0.wave = Some(wave);
        self
    }

    #[must_use]
    pub fn quest_set_id(mut self, quest_set_id: Option<String>) -> Self {
        self.0.quest_set_id = Some(quest_set_id);
        self
    }

    #[must_use]
    pub fn task_proofs(mut self, task_proofs: BTreeMap<String, ProofValue>) -> Self {
        self.0.task_proofs = Some(task_proofs);
        self
    }

    #[must_use]
    pub fn proof_statuses(mut self, proof_statuses: BTreeMap<String, ProofStatus>) -> Self {
        self.0.proof_statuses = Some(proof_statuses);
        self
    }

    #[must_use]
    pub fn proof_patch(mut self, challenge_id: impl Into<String>, patch: ProofPatch) -> Self {
        self.0
            .proof_patches
            .get_or_insert_with(BTreeMap::new)
            .insert(challenge_id.into(), patch);
        self
    }

    #[must_use]
    pub fn build(self) -> ApplicationUpdate {
        self.0
    }
}
