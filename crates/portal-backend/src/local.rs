//! The in-process backend: libSQL store plus outbox mailer.
//!
//! Every mutation runs under one process-wide write lock, which turns code
//! issuance's look-up-then-insert into a critical section: two concurrent
//! `issue_code` calls for the same application cannot both miss the lookup.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use portal_config::{CodeConfig, MailConfig, PortalConfig, ReminderConfig, StoreConfig};
use portal_core::entities::{
    Application, CURRENT_SCHEMA_VERSION, ClassConfig, InviteCode, NewApplication, ProofValue,
};
use portal_core::enums::{ApplicationStatus, EntityType};
use portal_core::ids::{generate_blob_id, generate_code, generate_id, normalize_code};
use portal_core::migration::migrate_config;
use portal_core::updates::ApplicationUpdate;
use portal_core::validate::{is_plausible_email, validate_submission, validate_update_proofs};
use portal_db::error::DatabaseError;
use portal_db::{NewBlob, PortalDb, StoredBlob};
use tokio::sync::Mutex;

use crate::backend::Backend;
use crate::error::{OrNotFound, PortalError};
use crate::images::decode_data_uri;
use crate::mailer::{Mail, MailError, Mailer, OutboxMailer};

/// Open (creating if needed) the store described by `store`.
///
/// # Errors
///
/// Returns `PortalError::Storage` if the directory or database cannot be
/// created.
pub async fn open_store(store: &StoreConfig) -> Result<PortalDb, PortalError> {
    if !store.is_in_memory() {
        if let Some(parent) = Path::new(&store.db_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                PortalError::Storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
    }
    Ok(PortalDb::open_local(&store.db_path).await?)
}

/// The outbox mailer `config` asks for.
///
/// # Errors
///
/// Returns `PortalError::Storage` if the outbox directory cannot be created.
pub fn mailer_from_config(config: &PortalConfig) -> Result<Arc<dyn Mailer>, PortalError> {
    if !config.mail.enabled {
        return Ok(Arc::new(OutboxMailer::disabled()));
    }
    let mailer = OutboxMailer::new(PathBuf::from(&config.store.outbox_path))
        .map_err(|e| PortalError::Storage(e.to_string()))?;
    Ok(Arc::new(mailer))
}

pub struct LocalBackend {
    db: Arc<PortalDb>,
    mailer: Arc<dyn Mailer>,
    codes: CodeConfig,
    mail: MailConfig,
    reminders: ReminderConfig,
    blob_base_url: OnceLock<String>,
    write_lock: Mutex<()>,
}

impl LocalBackend {
    #[must_use]
    pub fn new(db: Arc<PortalDb>, mailer: Arc<dyn Mailer>, config: &PortalConfig) -> Self {
        Self {
            db,
            mailer,
            codes: config.codes.clone(),
            mail: config.mail.clone(),
            reminders: config.reminders.clone(),
            blob_base_url: OnceLock::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Open the store and outbox named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Storage` if either cannot be opened.
    pub async fn open(config: &PortalConfig) -> Result<Self, PortalError> {
        let db = Arc::new(open_store(&config.store).await?);
        Ok(Self::new(db, mailer_from_config(config)?, config))
    }

    #[must_use]
    pub const fn db(&self) -> &Arc<PortalDb> {
        &self.db
    }

    /// Persist image proofs as `<base_url>/blobs/<id>` instead of a bare
    /// blob id. Set once, by the server that hosts the blobs.
    pub fn host_blobs_at(&self, base_url: &str) {
        let base = base_url.trim_end_matches('/').to_string();
        if self.blob_base_url.set(base.clone()).is_err() {
            tracing::debug!(%base, "blob base URL already set; keeping the first");
        }
    }

    /// Bytes and MIME type of a stored image proof, by blob id or by the
    /// hosted URL stored on the proof.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::NotFound` if no blob has this id.
    pub async fn get_blob(&self, reference: &str) -> Result<StoredBlob, PortalError> {
        let id = reference
            .rsplit_once("/blobs/")
            .map_or(reference, |(_, id)| id);
        self.db.get_blob(id).await.or_not_found(EntityType::Blob, id)
    }

    /// Send reminders for sessions starting between `now` and the end of the
    /// reminder window.
    ///
    /// # Errors
    ///
    /// Returns `PortalError` if the config, applications or codes cannot be read.
    pub async fn trigger_reminders_at(&self, now: DateTime<Utc>) -> Result<u32, PortalError> {
        let config = self.load_config().await?;
        let window_end = now + Duration::hours(i64::from(self.reminders.window_hours));

        let holders: HashMap<String, InviteCode> = self
            .db
            .list_codes()
            .await?
            .into_iter()
            .map(|c| (c.application_id.clone(), c))
            .collect();

        let mut sent = 0u32;
        for app in self
            .db
            .list_applications_by_status(ApplicationStatus::Approved)
            .await?
        {
            if !holders.contains_key(&app.id) {
                continue;
            }
            for session in config.sessions_for(app.quest_set_id.as_deref()) {
                let Some(starts_at) = session.starts_at() else {
                    tracing::debug!(session = %session.id, "session time does not parse; skipping");
                    continue;
                };
                if starts_at < now || starts_at > window_end {
                    continue;
                }
                let mail =
                    Mail::session_reminder(&self.mail, &app.email, &config.title, session, starts_at);
                if self.notify(&mail) {
                    sent += 1;
                }
            }
        }

        tracing::info!(sent, "session reminders sent");
        Ok(sent)
    }

    async fn load_config(&self) -> Result<ClassConfig, PortalError> {
        let raw = self.db.get_config_raw().await?;
        migrate_config(raw.unwrap_or_default())
            .map_err(|e| PortalError::CorruptRecord(format!("class_config: {e}")))
    }

    /// Swap inline `data:` images for blob references and return the blobs
    /// to write with the record.
    fn take_inline_images(
        &self,
        proofs: &mut BTreeMap<String, ProofValue>,
    ) -> Result<Vec<NewBlob>, PortalError> {
        let mut blobs = Vec::new();
        for (key, value) in proofs.iter_mut() {
            let Some(uri) = value.inline_image() else {
                continue;
            };
            let image = decode_data_uri(uri)?;
            let id = generate_blob_id()?;
            tracing::debug!(task = %key, blob = %id, bytes = image.data.len(), "image proof extracted");
            *value = ProofValue::Image(match self.blob_base_url.get() {
                Some(base) => format!("{base}/blobs/{id}"),
                None => id.clone(),
            });
            blobs.push(NewBlob {
                id,
                mime: image.mime,
                data: image.data,
            });
        }
        Ok(blobs)
    }

    async fn fresh_application_id(&self) -> Result<String, PortalError> {
        loop {
            let id = generate_id()?;
            match self.db.get_application(&id).await {
                Err(DatabaseError::NoResult) => return Ok(id),
                Ok(_) | Err(DatabaseError::Corrupt { .. }) => {
                    tracing::debug!(%id, "application id collision; regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Generate a code not yet in the code collection.
    async fn fresh_code(&self) -> Result<String, PortalError> {
        for attempt in 1..=self.codes.max_generation_attempts {
            let code = generate_code(&self.codes.prefix, self.codes.suffix_len)?;
            if !self.db.code_exists(&code).await? {
                return Ok(code);
            }
            tracing::debug!(attempt, "invite code collision; regenerating");
        }
        Err(PortalError::Storage(format!(
            "no unique invite code after {} attempts",
            self.codes.max_generation_attempts
        )))
    }

    async fn class_title(&self) -> String {
        match self.load_config().await {
            Ok(config) => config.title,
            Err(e) => {
                tracing::warn!(error = %e, "class config unreadable; using default title in mail");
                ClassConfig::default().title
            }
        }
    }

    /// Hand `mail` to the mailer. Failures are logged, never propagated.
    fn notify(&self, mail: &Mail) -> bool {
        match self.mailer.send(mail) {
            Ok(()) => true,
            Err(MailError::Disabled) => {
                tracing::debug!(to = %mail.to, kind = ?mail.kind, "mail disabled; message dropped");
                false
            }
            Err(e) => {
                tracing::warn!(to = %mail.to, error = %e, "mail not sent");
                false
            }
        }
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn get_config(&self) -> Result<ClassConfig, PortalError> {
        tracing::debug!("loading class config");
        self.load_config().await
    }

    async fn update_config(&self, mut config: ClassConfig) -> Result<(), PortalError> {
        config.schema_version = CURRENT_SCHEMA_VERSION;
        let _guard = self.write_lock.lock().await;
        self.db.put_config(&config).await?;
        tracing::info!(title = %config.title, "class config saved");
        Ok(())
    }

    async fn submit_application(
        &self,
        submission: NewApplication,
    ) -> Result<Application, PortalError> {
        let config = self.load_config().await?;
        let mut proofs = validate_submission(&config, &submission)?;

        let blobs = self.take_inline_images(&mut proofs)?;

        let _guard = self.write_lock.lock().await;
        let id = self.fresh_application_id().await?;
        let app = Application::from_submission(id, submission, proofs, Utc::now());
        self.db.insert_application_with_blobs(&app, &blobs).await?;
        tracing::info!(id = %app.id, email = %app.email, "application submitted");
        Ok(app)
    }

    async fn list_applications(&self) -> Result<Vec<Application>, PortalError> {
        Ok(self.db.list_applications().await?)
    }

    async fn get_application(&self, id: &str) -> Result<Application, PortalError> {
        self.db
            .get_application(id)
            .await
            .or_not_found(EntityType::Application, id)
    }

    async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), PortalError> {
        let _guard = self.write_lock.lock().await;
        let mut app = self.get_application(id).await?;
        if !app.status.can_transition_to(status) {
            return Err(PortalError::InvalidTransition {
                id: id.to_string(),
                from: app.status.to_string(),
                to: status.to_string(),
            });
        }
        if app.status == status {
            tracing::debug!(id, %status, "status unchanged");
            return Ok(());
        }
        app.status = status;
        self.db
            .replace_application(&app)
            .await
            .or_not_found(EntityType::Application, id)?;
        tracing::info!(id, %status, "application status changed");
        Ok(())
    }

    async fn update_application(
        &self,
        id: &str,
        mut update: ApplicationUpdate,
    ) -> Result<(), PortalError> {
        if let Some(email) = &update.email {
            if !is_plausible_email(email) {
                return Err(PortalError::Validation(format!(
                    "'{email}' is not a valid email address"
                )));
            }
        }
        if update.wave == Some(0) {
            return Err(PortalError::Validation("wave starts at 1".into()));
        }

        let config = self.load_config().await?;

        let _guard = self.write_lock.lock().await;
        let mut app = self.get_application(id).await?;
        let quest_set_id = match &update.quest_set_id {
            Some(updated) => updated.clone(),
            None => app.quest_set_id.clone(),
        };
        validate_update_proofs(&config, quest_set_id.as_deref(), &mut update)?;
        update.apply_to(&mut app)?;
        let blobs = self.take_inline_images(&mut app.task_proofs)?;
        self.db
            .replace_application_with_blobs(&app, &blobs)
            .await
            .or_not_found(EntityType::Application, id)?;
        tracing::info!(id, "application updated");
        Ok(())
    }

    async fn issue_code(
        &self,
        application_id: &str,
        email: &str,
    ) -> Result<InviteCode, PortalError> {
        let code = {
            let _guard = self.write_lock.lock().await;
            let app = self.get_application(application_id).await?;

            if let Some(existing) = self.db.find_code_for_application(application_id).await? {
                tracing::info!(application_id, code = %existing.code, "re-sending existing invite code");
                existing
            } else {
                let email = match email.trim() {
                    "" => app.email,
                    given => given.to_string(),
                };
                let code = InviteCode {
                    id: generate_id()?,
                    code: self.fresh_code().await?,
                    email,
                    application_id: app.id,
                    used: false,
                    generated_at: Utc::now(),
                };
                self.db.insert_code(&code).await?;
                tracing::info!(application_id, code = %code.code, "invite code issued");
                code
            }
        };

        let title = self.class_title().await;
        self.notify(&Mail::invite_code(&self.mail, &title, &code));
        Ok(code)
    }

    async fn list_codes(&self) -> Result<Vec<InviteCode>, PortalError> {
        Ok(self.db.list_codes().await?)
    }

    async fn redeem_code(&self, code: &str) -> Result<bool, PortalError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;
        let Some(stored) = self.db.find_code(&code).await? else {
            tracing::info!(%code, "redemption of unknown code");
            return Ok(false);
        };
        if stored.used {
            tracing::info!(%code, allowed = self.codes.allow_repeated_redemption, "repeat redemption");
            return Ok(self.codes.allow_repeated_redemption);
        }
        self.db
            .mark_code_used(&stored.id)
            .await
            .or_not_found(EntityType::InviteCode, &stored.id)?;
        tracing::info!(%code, application_id = %stored.application_id, "invite code redeemed");
        Ok(true)
    }

    async fn trigger_reminders(&self) -> Result<u32, PortalError> {
        self.trigger_reminders_at(Utc::now()).await
    }
}
