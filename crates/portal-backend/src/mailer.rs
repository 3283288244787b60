//! Outbound email.
//!
//! The portal never talks SMTP itself. Every message is handed to a
//! [`Mailer`]; the stock implementation appends it as one JSON line to an
//! outbox file for a delivery agent to pick up.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use portal_config::MailConfig;
use portal_core::entities::{ClassSession, InviteCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("outbox write failed: {0}")]
    Outbox(#[from] std::io::Error),

    /// Mail is switched off; the message was dropped.
    #[error("mail is disabled")]
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailKind {
    InviteCode,
    SessionReminder,
}

/// One queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mail {
    pub kind: MailKind,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

impl Mail {
    /// The approval email carrying the applicant's access code.
    #[must_use]
    pub fn invite_code(settings: &MailConfig, class_title: &str, code: &InviteCode) -> Self {
        let mut body = format!(
            "Good news! Your application to {class_title} was approved.\n\n\
             Your access code is: {}\n",
            code.code
        );
        if !settings.portal_url.is_empty() {
            body.push_str(&format!("\nEnter it at {} to get started.\n", settings.portal_url));
        }
        Self {
            kind: MailKind::InviteCode,
            from: settings.from.clone(),
            to: code.email.clone(),
            subject: format!("Your access code for {class_title}"),
            body,
            queued_at: Utc::now(),
        }
    }

    /// A heads-up about an upcoming session.
    #[must_use]
    pub fn session_reminder(
        settings: &MailConfig,
        to: &str,
        class_title: &str,
        session: &ClassSession,
        starts_at: DateTime<Utc>,
    ) -> Self {
        let mut body = format!(
            "Reminder: \"{}\" ({class_title}) starts {} UTC",
            session.title,
            starts_at.format("%A %d %B at %H:%M")
        );
        if !session.location.is_empty() {
            body.push_str(&format!(" at {}", session.location));
        }
        body.push_str(".\n");
        Self {
            kind: MailKind::SessionReminder,
            from: settings.from.clone(),
            to: to.to_string(),
            subject: format!("Upcoming session: {}", session.title),
            body,
            queued_at: Utc::now(),
        }
    }
}

/// Delivers (or queues) outbound mail.
pub trait Mailer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`MailError`] if the message could not be queued, including
    /// [`MailError::Disabled`] when it was deliberately dropped.
    fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Appends each message to a JSONL outbox file.
pub struct OutboxMailer {
    path: PathBuf,
    enabled: bool,
}

impl OutboxMailer {
    /// Create a mailer writing to `path`, creating its parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] if the directory cannot be created.
    pub fn new(path: PathBuf) -> Result<Self, MailError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            enabled: true,
        })
    }

    /// A mailer that drops every message.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailError> {
        if !self.enabled {
            return Err(MailError::Disabled);
        }
        serde_jsonlines::append_json_lines(&self.path, [mail])?;
        tracing::debug!(to = %mail.to, kind = ?mail.kind, "queued mail");
        Ok(())
    }
}

/// Keeps messages in memory. Used by tests and embedded servers.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Mail>>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<Mail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, mail: &Mail) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail.clone());
        Ok(())
    }
}
