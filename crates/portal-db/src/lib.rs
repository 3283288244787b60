//! # portal-db
//!
//! libSQL record store for the class portal.
//!
//! Holds the application and invite-code collections, the class config
//! singleton, local settings (admin flag, configured backend URL) and image
//! proof blobs. Each entity row carries a handful of indexed columns next to
//! the full record serialized as JSON, which is what reads decode. A row whose
//! JSON no longer matches the entity shape surfaces as
//! [`DatabaseError::Corrupt`].
//!
//! The store itself does no locking: callers that need check-then-insert
//! atomicity (code issuance) serialize their writes above this layer.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

use error::DatabaseError;
use libsql::Builder;

pub use repos::blobs::{NewBlob, StoredBlob};

/// Central database handle for all portal state.
pub struct PortalDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl PortalDb {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let portal_db = Self { db, conn };
        portal_db.run_migrations().await?;
        tracing::debug!(path, "opened portal store");
        Ok(portal_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
