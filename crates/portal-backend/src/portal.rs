//! Admin and student workflows on top of a [`Backend`].
//!
//! The backend only knows single-record operations. `Portal` adds the status
//! machine's side effects (approval issues a code), batch approval with
//! partial-failure reporting, proof review, and XP progress.

use portal_core::entities::{Application, ClassConfig, InviteCode, NewApplication, ProofValue};
use portal_core::enums::{ApplicationStatus, EntityType};
use portal_core::progress::progress_for;
use portal_core::responses::{BatchFailure, BatchReport, ProgressReport};
use portal_core::updates::{ApplicationUpdateBuilder, ProofPatch};

use crate::backend::Backend;
use crate::error::PortalError;

pub struct Portal<B> {
    backend: B,
}

impl<B: Backend> Portal<B> {
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit a new application.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Validation` for a malformed submission, or the
    /// backend's error.
    pub async fn apply(&self, submission: NewApplication) -> Result<Application, PortalError> {
        self.backend.submit_application(submission).await
    }

    /// Approve an application and issue its code.
    ///
    /// Re-approving an approved application is allowed and returns the code
    /// issued the first time.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown id,
    /// `PortalError::InvalidTransition` for a rejected application, or the
    /// backend's error.
    pub async fn approve(&self, id: &str) -> Result<InviteCode, PortalError> {
        let app = self.backend.get_application(id).await?;
        self.backend
            .update_status(id, ApplicationStatus::Approved)
            .await?;
        self.backend.issue_code(&app.id, &app.email).await
    }

    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown id,
    /// `PortalError::InvalidTransition` for an approved application, or the
    /// backend's error.
    pub async fn reject(&self, id: &str) -> Result<(), PortalError> {
        self.backend
            .update_status(id, ApplicationStatus::Rejected)
            .await
    }

    /// Approve each id in turn. A failure is recorded and the batch carries
    /// on; nothing already approved is rolled back.
    pub async fn approve_batch(&self, ids: &[String]) -> BatchReport {
        let mut report = BatchReport::default();
        for id in ids {
            match self.approve(id).await {
                Ok(_) => report.approved.push(id.clone()),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "batch approval failed for application");
                    report.failed.push(BatchFailure {
                        application_id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            approved = report.succeeded(),
            failed = report.failed.len(),
            "batch approval finished"
        );
        report
    }

    /// Set or clear the admin note.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown id.
    pub async fn set_note(&self, id: &str, note: Option<String>) -> Result<(), PortalError> {
        let update = ApplicationUpdateBuilder::new().admin_note(note).build();
        self.backend.update_application(id, update).await
    }

    /// Submit (or resubmit) a proof for a learning challenge.
    ///
    /// The value is classified by the challenge's declared proof type. Any
    /// earlier review of that challenge is cleared. Only this challenge's
    /// entry is written, so concurrent reviews of other challenges survive.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown application or
    /// challenge, and `PortalError::Validation` if the student is not admitted
    /// or the proof does not fit its type.
    pub async fn submit_proof(
        &self,
        app_id: &str,
        challenge_id: &str,
        raw: &str,
    ) -> Result<ProofValue, PortalError> {
        let config = self.backend.get_config().await?;
        let challenge = config
            .find_challenge(challenge_id)
            .ok_or_else(|| PortalError::not_found(EntityType::Challenge, challenge_id))?;
        let value = ProofValue::classify(challenge.proof_type, challenge_id, raw)?;

        self.patch_proof(
            app_id,
            challenge_id,
            ProofPatch::Submit {
                proof: value.clone(),
            },
        )
        .await?;
        tracing::info!(app_id, challenge_id, kind = %value.proof_type(), "proof submitted");
        Ok(value)
    }

    /// Mark a submitted proof approved, awarding the challenge's XP.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown application and
    /// `PortalError::Validation` if no proof was submitted for the challenge.
    pub async fn approve_proof(&self, app_id: &str, challenge_id: &str) -> Result<(), PortalError> {
        self.patch_proof(app_id, challenge_id, ProofPatch::Approve)
            .await?;
        tracing::info!(app_id, challenge_id, "proof approved");
        Ok(())
    }

    /// Delete a submitted proof and its review so the student can redo it.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown application and
    /// `PortalError::Validation` if no proof was submitted for the challenge.
    pub async fn reject_proof(&self, app_id: &str, challenge_id: &str) -> Result<(), PortalError> {
        self.patch_proof(app_id, challenge_id, ProofPatch::Reject)
            .await?;
        tracing::info!(app_id, challenge_id, "proof rejected");
        Ok(())
    }

    async fn patch_proof(
        &self,
        app_id: &str,
        challenge_id: &str,
        patch: ProofPatch,
    ) -> Result<(), PortalError> {
        let update = ApplicationUpdateBuilder::new()
            .proof_patch(challenge_id, patch)
            .build();
        self.backend.update_application(app_id, update).await
    }

    /// XP, level and review backlog of one student.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` for an unknown application.
    pub async fn progress(&self, app_id: &str) -> Result<ProgressReport, PortalError> {
        let app = self.backend.get_application(app_id).await?;
        let config = self.backend.get_config().await?;
        Ok(progress_for(&config, &app))
    }

    /// Overwrite the class config with the built-in default.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn reset_config(&self) -> Result<ClassConfig, PortalError> {
        let config = ClassConfig::default();
        self.backend.update_config(config.clone()).await?;
        Ok(config)
    }
}

