//! # portal-backend
//!
//! The class portal's backend adapter.
//!
//! - [`Backend`]: one typed async method per wire action.
//! - [`LocalBackend`]: libSQL store, outbox mail, and the code issuance and
//!   redemption protocol, with a single-writer lock around mutations.
//! - [`RemoteBackend`]: the same contract over HTTP to a remote endpoint.
//! - [`ActiveBackend`]: picks local or remote from the configured or saved URL.
//! - [`Portal`]: approval side effects, batch approval, proof review, XP.
//! - [`dispatch()`]: raw action name + JSON in, JSON reply out, for servers.
//!
//! All failures are [`PortalError`]s.

mod active;
mod backend;
pub mod dispatch;
mod error;
pub mod images;
mod local;
pub mod mailer;
mod portal;
mod remote;
mod settings;

pub use active::ActiveBackend;
pub use backend::Backend;
pub use dispatch::dispatch;
pub use error::PortalError;
pub use local::{LocalBackend, mailer_from_config, open_store};
pub use mailer::{Mail, MailError, MailKind, Mailer, MemoryMailer, OutboxMailer};
pub use portal::Portal;
pub use remote::RemoteBackend;
pub use settings::LocalSettings;
