//! Server-side checks on submitted applications and proofs.

use std::collections::BTreeMap;

use crate::entities::{ClassConfig, NewApplication, ProofValue};
use crate::enums::ProofType;
use crate::errors::CoreError;
use crate::ids::is_blob_id;
use crate::updates::{ApplicationUpdate, ProofPatch};

/// Loose `local@domain.tld` check; the mailbox is confirmed by the code email.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Validate a submission against the class config and classify its proofs.
///
/// Returns the typed proof map to persist.
///
/// # Errors
///
/// Returns `CoreError::Validation` when applications are closed, a field is
/// missing or malformed, the quest set is unknown, a proof names an unknown
/// task, or a required task has no proof.
pub fn validate_submission(
    config: &ClassConfig,
    submission: &NewApplication,
) -> Result<BTreeMap<String, ProofValue>, CoreError> {
    if !config.accepting_applications {
        return Err(CoreError::Validation(
            "applications are currently closed".into(),
        ));
    }
    if !is_plausible_email(&submission.email) {
        return Err(CoreError::Validation(format!(
            "'{}' is not a valid email address",
            submission.email
        )));
    }
    if submission.full_name.trim().is_empty() {
        return Err(CoreError::Validation("fullName is required".into()));
    }
    if submission.why_join.trim().is_empty() {
        return Err(CoreError::Validation("whyJoin is required".into()));
    }
    if submission.wave == Some(0) {
        return Err(CoreError::Validation("wave starts at 1".into()));
    }

    let quest_set_id = submission.quest_set_id.as_deref();
    let tasks = config.tasks_for(quest_set_id).ok_or_else(|| {
        CoreError::Validation(format!(
            "unknown quest set '{}'",
            quest_set_id.unwrap_or_default()
        ))
    })?;

    let mut proofs = BTreeMap::new();
    for (key, raw) in &submission.task_proofs {
        let task = tasks
            .iter()
            .find(|t| &t.id == key)
            .ok_or_else(|| CoreError::Validation(format!("proof given for unknown task '{key}'")))?;
        if raw.trim().is_empty() && !task.required {
            continue;
        }
        proofs.insert(key.clone(), ProofValue::classify(task.proof_type, key, raw)?);
    }

    if let Some(missing) = tasks
        .iter()
        .find(|t| t.required && !proofs.contains_key(&t.id))
    {
        return Err(CoreError::Validation(format!(
            "task '{}' requires a proof",
            missing.id
        )));
    }

    Ok(proofs)
}

/// Re-check a proof written straight onto a stored application.
///
/// The value is classified against its declared type when the key names a
/// task or challenge, otherwise against its own variant. A stored blob id is
/// accepted as an image.
///
/// # Errors
///
/// Returns `CoreError::Validation` for an empty key or a value that does not
/// fit its type.
pub fn validate_stored_proof(
    config: &ClassConfig,
    quest_set_id: Option<&str>,
    key: &str,
    value: ProofValue,
) -> Result<ProofValue, CoreError> {
    if key.trim().is_empty() {
        return Err(CoreError::Validation("proof key is empty".into()));
    }
    let declared = config
        .declared_proof_type(quest_set_id, key)
        .unwrap_or_else(|| value.proof_type());
    if declared == ProofType::Image && is_blob_id(value.as_str()) {
        return Ok(ProofValue::Image(value.as_str().to_string()));
    }
    ProofValue::classify(declared, key, value.as_str())
}

/// Run [`validate_stored_proof`] over every proof an update writes.
///
/// # Errors
///
/// Returns the first proof's `CoreError::Validation`.
pub fn validate_update_proofs(
    config: &ClassConfig,
    quest_set_id: Option<&str>,
    update: &mut ApplicationUpdate,
) -> Result<(), CoreError> {
    if let Some(proofs) = update.task_proofs.take() {
        let checked = proofs
            .into_iter()
            .map(|(key, value)| {
                let value = validate_stored_proof(config, quest_set_id, &key, value)?;
                Ok((key, value))
            })
            .collect::<Result<BTreeMap<_, _>, CoreError>>()?;
        update.task_proofs = Some(checked);
    }
    if update
        .proof_statuses
        .as_ref()
        .is_some_and(|statuses| statuses.keys().any(|k| k.trim().is_empty()))
    {
        return Err(CoreError::Validation("proof status key is empty".into()));
    }
    for (key, patch) in update.proof_patches.iter_mut().flatten() {
        if let ProofPatch::Submit { proof } = patch {
            *proof = validate_stored_proof(config, quest_set_id, key, proof.clone())?;
        }
    }
    Ok(())
}
