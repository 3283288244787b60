//! Admin and student workflows through [`Portal`].
//!
//! - Approval issues exactly one code, re-approval returns it
//! - Batch approval reports partial failures without rollback
//! - Proof review and XP progress
//! - Session reminders inside the configured window

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use portal_backend::{
    Backend, LocalBackend, MailKind, MemoryMailer, OutboxMailer, Portal, PortalError,
};
use portal_config::PortalConfig;
use portal_core::entities::{
    Application, ClassConfig, ClassSession, InviteCode, LearningChallenge, LearningModule,
    NewApplication, ProofValue, QuestSet,
};
use portal_core::enums::{ApplicationStatus, ProofStatus, ProofType};
use portal_core::updates::{ApplicationUpdate, ApplicationUpdateBuilder, ProofPatch};
use portal_db::PortalDb;
use tokio::sync::Barrier;

async fn local(mailer: Arc<MemoryMailer>) -> LocalBackend {
    let db = Arc::new(PortalDb::open_local(":memory:").await.unwrap());
    LocalBackend::new(db, mailer, &PortalConfig::default())
}

fn submission(email: &str) -> NewApplication {
    NewApplication {
        email: email.into(),
        full_name: "Student".into(),
        why_join: "to learn".into(),
        task_proofs: [("t1".to_string(), "@student".to_string())].into(),
        ..NewApplication::default()
    }
}

/// Wraps a local backend and fails code issuance for one application.
/// With a gate, every record update waits until all gated callers arrive.
struct FlakyBackend {
    inner: LocalBackend,
    fail_for: String,
    update_gate: Option<Barrier>,
}

impl FlakyBackend {
    fn gated(inner: LocalBackend, callers: usize) -> Self {
        Self {
            inner,
            fail_for: String::new(),
            update_gate: Some(Barrier::new(callers)),
        }
    }
}

#[async_trait]
impl Backend for FlakyBackend {
    async fn get_config(&self) -> Result<ClassConfig, PortalError> {
        self.inner.get_config().await
    }

    async fn update_config(&self, config: ClassConfig) -> Result<(), PortalError> {
        self.inner.update_config(config).await
    }

    async fn submit_application(
        &self,
        submission: NewApplication,
    ) -> Result<Application, PortalError> {
        self.inner.submit_application(submission).await
    }

    async fn list_applications(&self) -> Result<Vec<Application>, PortalError> {
        self.inner.list_applications().await
    }

    async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), PortalError> {
        self.inner.update_status(id, status).await
    }

    async fn update_application(
        &self,
        id: &str,
        update: ApplicationUpdate,
    ) -> Result<(), PortalError> {
        if let Some(gate) = &self.update_gate {
            gate.wait().await;
        }
        self.inner.update_application(id, update).await
    }

    async fn issue_code(&self, application_id: &str, email: &str) -> Result<InviteCode, PortalError> {
        if application_id == self.fail_for {
            return Err(PortalError::BackendUnavailable("connection reset".into()));
        }
        self.inner.issue_code(application_id, email).await
    }

    async fn list_codes(&self) -> Result<Vec<InviteCode>, PortalError> {
        self.inner.list_codes().await
    }

    async fn redeem_code(&self, code: &str) -> Result<bool, PortalError> {
        self.inner.redeem_code(code).await
    }

    async fn trigger_reminders(&self) -> Result<u32, PortalError> {
        self.inner.trigger_reminders().await
    }
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn approve_then_reapprove_yields_one_code() {
    let mailer = Arc::new(MemoryMailer::new());
    let portal = Portal::new(local(Arc::clone(&mailer)).await);
    let app = portal.apply(submission("new@example.com")).await.unwrap();

    let first = portal.approve(&app.id).await.unwrap();
    let second = portal.approve(&app.id).await.unwrap();

    assert_eq!(first.code, second.code);
    assert_eq!(first.email, "new@example.com");
    let codes = portal.backend().list_codes().await.unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(
        portal.backend().get_application(&app.id).await.unwrap().status,
        ApplicationStatus::Approved
    );
    assert!(mailer.sent().iter().all(|m| m.kind == MailKind::InviteCode));
    assert!(mailer.sent().iter().all(|m| m.body.contains(&first.code)));
}

#[tokio::test]
async fn rejected_application_cannot_be_approved() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    let app = portal.apply(submission("no@example.com")).await.unwrap();

    portal.reject(&app.id).await.unwrap();
    assert!(matches!(
        portal.approve(&app.id).await,
        Err(PortalError::InvalidTransition { .. })
    ));
    assert!(portal.backend().list_codes().await.unwrap().is_empty());
}

#[tokio::test]
async fn approving_unknown_id_is_not_found() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    assert!(matches!(
        portal.approve("missing00").await,
        Err(PortalError::NotFound { .. })
    ));
}

#[tokio::test]
async fn batch_reports_partial_failure_without_rollback() {
    let inner = local(Arc::new(MemoryMailer::new())).await;
    let mut ids = Vec::new();
    for n in 0..4 {
        let app = inner
            .submit_application(submission(&format!("s{n}@example.com")))
            .await
            .unwrap();
        ids.push(app.id);
    }
    let portal = Portal::new(FlakyBackend {
        inner,
        fail_for: ids[2].clone(),
        update_gate: None,
    });

    let report = portal.approve_batch(&ids).await;

    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].application_id, ids[2]);
    assert!(report.failed[0].error.contains("connection reset"));

    let codes = portal.backend().list_codes().await.unwrap();
    assert_eq!(codes.len(), 3);
    assert!(codes.iter().all(|c| c.application_id != ids[2]));
    for id in [&ids[0], &ids[1], &ids[3]] {
        assert_eq!(
            portal.backend().get_application(id).await.unwrap().status,
            ApplicationStatus::Approved
        );
    }
}

#[tokio::test]
async fn note_can_be_set_and_cleared() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    let app = portal.apply(submission("n@example.com")).await.unwrap();

    portal.set_note(&app.id, Some("follow up".into())).await.unwrap();
    assert_eq!(
        portal.backend().get_application(&app.id).await.unwrap().admin_note.as_deref(),
        Some("follow up")
    );
    portal.set_note(&app.id, None).await.unwrap();
    assert_eq!(
        portal.backend().get_application(&app.id).await.unwrap().admin_note,
        None
    );
    assert!(matches!(
        portal.set_note("missing00", None).await,
        Err(PortalError::NotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// Proofs and progress
// ---------------------------------------------------------------------------

fn quest_config() -> ClassConfig {
    let challenge = |id: &str, xp: u32, proof_type: ProofType| LearningChallenge {
        id: id.into(),
        title: id.into(),
        description: String::new(),
        xp,
        proof_type,
    };
    ClassConfig {
        quest_sets: vec![QuestSet {
            id: "q-rust".into(),
            title: "Rust".into(),
            description: String::new(),
            tasks: Vec::new(),
            sessions: Vec::new(),
            resources: Vec::new(),
            modules: vec![LearningModule {
                id: "m1".into(),
                title: "Ownership".into(),
                description: String::new(),
                challenges: vec![
                    challenge("c1", 60, ProofType::Link),
                    challenge("c2", 50, ProofType::Text),
                ],
            }],
        }],
        ..ClassConfig::default()
    }
}

#[tokio::test]
async fn proof_review_drives_progress() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    portal.backend().update_config(quest_config()).await.unwrap();
    let app = portal.apply(submission("xp@example.com")).await.unwrap();
    portal.approve(&app.id).await.unwrap();

    let value = portal
        .submit_proof(&app.id, "c1", "https://github.com/me/kata")
        .await
        .unwrap();
    assert_eq!(value, ProofValue::Link("https://github.com/me/kata".into()));
    portal.submit_proof(&app.id, "c2", "done").await.unwrap();

    let before = portal.progress(&app.id).await.unwrap();
    assert_eq!(before.xp, 0);
    assert_eq!(before.pending_review, vec!["c1".to_string(), "c2".to_string()]);

    portal.approve_proof(&app.id, "c1").await.unwrap();
    portal.approve_proof(&app.id, "c2").await.unwrap();
    let after = portal.progress(&app.id).await.unwrap();
    assert_eq!(after.xp, 110);
    assert_eq!(after.level, 2);
    assert_eq!(after.approved_challenges, 2);
    assert!(after.pending_review.is_empty());

    portal.reject_proof(&app.id, "c2").await.unwrap();
    let redo = portal.progress(&app.id).await.unwrap();
    assert_eq!(redo.xp, 60);
    assert!(
        !portal
            .backend()
            .get_application(&app.id)
            .await
            .unwrap()
            .task_proofs
            .contains_key("c2")
    );
}

#[tokio::test]
async fn resubmitting_clears_earlier_review() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    portal.backend().update_config(quest_config()).await.unwrap();
    let app = portal.apply(submission("re@example.com")).await.unwrap();
    portal.approve(&app.id).await.unwrap();

    portal.submit_proof(&app.id, "c2", "first").await.unwrap();
    portal.approve_proof(&app.id, "c2").await.unwrap();
    portal.submit_proof(&app.id, "c2", "second").await.unwrap();

    let stored = portal.backend().get_application(&app.id).await.unwrap();
    assert!(stored.proof_statuses.is_empty());
    assert_eq!(stored.task_proofs["c2"], ProofValue::Text("second".into()));
}

#[tokio::test]
async fn proofs_need_an_admitted_student() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    portal.backend().update_config(quest_config()).await.unwrap();
    let app = portal.apply(submission("wait@example.com")).await.unwrap();

    assert!(matches!(
        portal.submit_proof(&app.id, "c2", "done").await,
        Err(PortalError::Validation(_))
    ));

    portal.approve(&app.id).await.unwrap();
    assert!(matches!(
        portal.submit_proof(&app.id, "c9", "done").await,
        Err(PortalError::NotFound { .. })
    ));
    assert!(matches!(
        portal.submit_proof(&app.id, "c1", "not a link").await,
        Err(PortalError::Validation(_))
    ));
    assert!(matches!(
        portal.approve_proof(&app.id, "c1").await,
        Err(PortalError::Validation(_))
    ));
}

#[tokio::test]
async fn concurrent_reviews_of_different_challenges_both_land() {
    let inner = local(Arc::new(MemoryMailer::new())).await;
    inner.update_config(quest_config()).await.unwrap();
    let app = inner.submit_application(submission("race@example.com")).await.unwrap();
    inner
        .update_status(&app.id, ApplicationStatus::Approved)
        .await
        .unwrap();
    inner
        .update_application(
            &app.id,
            ApplicationUpdateBuilder::new()
                .proof_patch(
                    "c1",
                    ProofPatch::Submit {
                        proof: ProofValue::Link("https://github.com/me/kata".into()),
                    },
                )
                .build(),
        )
        .await
        .unwrap();

    let portal = Portal::new(FlakyBackend::gated(inner, 2));
    let (approved, submitted) = tokio::join!(
        portal.approve_proof(&app.id, "c1"),
        portal.submit_proof(&app.id, "c2", "done"),
    );
    approved.unwrap();
    submitted.unwrap();

    let stored = portal.backend().get_application(&app.id).await.unwrap();
    assert_eq!(
        stored.proof_statuses.get("c1"),
        Some(&ProofStatus::Approved)
    );
    assert_eq!(stored.task_proofs["c2"], ProofValue::Text("done".into()));
    assert_eq!(portal.progress(&app.id).await.unwrap().xp, 60);
}

#[tokio::test]
async fn direct_updates_check_proof_types() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    let app = portal.apply(submission("typed@example.com")).await.unwrap();

    let bad = ApplicationUpdateBuilder::new()
        .task_proofs([("t2".to_string(), ProofValue::Text("not a link".into()))].into())
        .build();
    assert!(matches!(
        portal.backend().update_application(&app.id, bad).await,
        Err(PortalError::Validation(_))
    ));

    let empty_key = ApplicationUpdateBuilder::new()
        .task_proofs([(String::new(), ProofValue::Text("x".into()))].into())
        .build();
    assert!(portal.backend().update_application(&app.id, empty_key).await.is_err());

    let good = ApplicationUpdateBuilder::new()
        .task_proofs([("t2".to_string(), ProofValue::Text("https://ok.dev".into()))].into())
        .build();
    portal.backend().update_application(&app.id, good).await.unwrap();
    let stored = portal.backend().get_application(&app.id).await.unwrap();
    assert_eq!(stored.task_proofs["t2"], ProofValue::Link("https://ok.dev".into()));
    assert!(!stored.task_proofs.contains_key("t1"));
}

#[tokio::test]
async fn reset_config_restores_default() {
    let portal = Portal::new(local(Arc::new(MemoryMailer::new())).await);
    portal.backend().update_config(quest_config()).await.unwrap();

    let config = portal.reset_config().await.unwrap();
    assert_eq!(config, ClassConfig::default());
    assert_eq!(portal.backend().get_config().await.unwrap(), ClassConfig::default());
}

// ---------------------------------------------------------------------------
// Reminders
// ---------------------------------------------------------------------------

fn session(id: &str, date: &str, time: &str) -> ClassSession {
    ClassSession {
        id: id.into(),
        title: format!("Session {id}"),
        date: date.into(),
        time: time.into(),
        location: "Lab".into(),
    }
}

#[tokio::test]
async fn reminders_cover_sessions_inside_window() {
    let mailer = Arc::new(MemoryMailer::new());
    let portal = Portal::new(local(Arc::clone(&mailer)).await);
    portal
        .backend()
        .update_config(ClassConfig {
            sessions: vec![
                session("soon", "2026-11-01", "18:00"),
                session("later", "2026-11-05", "18:00"),
                session("past", "2026-10-30", "18:00"),
                session("bad", "someday", ""),
            ],
            ..ClassConfig::default()
        })
        .await
        .unwrap();

    let admitted = portal.apply(submission("in@example.com")).await.unwrap();
    portal.approve(&admitted.id).await.unwrap();
    portal.apply(submission("waiting@example.com")).await.unwrap();

    let now = Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap();
    let sent = portal.backend().trigger_reminders_at(now).await.unwrap();
    assert_eq!(sent, 1);

    let reminders: Vec<_> = mailer
        .sent()
        .into_iter()
        .filter(|m| m.kind == MailKind::SessionReminder)
        .collect();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].to, "in@example.com");
    assert!(reminders[0].subject.contains("Session soon"));
}

#[tokio::test]
async fn reminders_with_no_sessions_send_nothing() {
    let mailer = Arc::new(MemoryMailer::new());
    let portal = Portal::new(local(Arc::clone(&mailer)).await);
    let app = portal.apply(submission("in@example.com")).await.unwrap();
    portal.approve(&app.id).await.unwrap();

    assert_eq!(portal.backend().trigger_reminders().await.unwrap(), 0);
    assert_eq!(mailer.sent().len(), 1);
}

#[tokio::test]
async fn reminders_with_mail_disabled_count_nothing() {
    let mut cfg = PortalConfig::default();
    cfg.mail.enabled = false;
    let db = Arc::new(PortalDb::open_local(":memory:").await.unwrap());
    let portal = Portal::new(LocalBackend::new(
        db,
        Arc::new(OutboxMailer::disabled()),
        &cfg,
    ));
    portal
        .backend()
        .update_config(ClassConfig {
            sessions: vec![session("soon", "2026-11-01", "18:00")],
            ..ClassConfig::default()
        })
        .await
        .unwrap();
    let app = portal.apply(submission("in@example.com")).await.unwrap();
    portal.approve(&app.id).await.unwrap();

    let now = Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap();
    assert_eq!(portal.backend().trigger_reminders_at(now).await.unwrap(), 0);
}
