//! Embedded schema, applied on every open.
//!
//! Statements are `IF NOT EXISTS`, so reopening an existing store is a no-op.

use crate::PortalDb;
use crate::error::DatabaseError;

/// Record tables, settings, and image blobs.
const SCHEMA_V1: &str = include_str!("../migrations/001_initial.sql");

impl PortalDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        tracing::debug!("applying store schema");
        self.conn
            .execute_batch(SCHEMA_V1)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
