//! Class config singleton.
//!
//! Stored as raw JSON so older documents survive until they are migrated on
//! read. Writes overwrite the whole document.

use chrono::Utc;
use portal_core::entities::ClassConfig;

use crate::PortalDb;
use crate::error::DatabaseError;
use crate::helpers::{decode_record, encode_record};

const TABLE: &str = "class_config";

impl PortalDb {
    /// The stored config document, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Corrupt` if the stored text is not JSON.
    pub async fn get_config_raw(&self) -> Result<Option<serde_json::Value>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT data FROM class_config WHERE id = 1", ())
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let data: String = row.get(0)?;
        decode_record(TABLE, "1", &data).map(Some)
    }

    /// Replace the stored config document.
    pub async fn put_config(&self, config: &ClassConfig) -> Result<(), DatabaseError> {
        self.put_config_raw(config.schema_version, &encode_record(config)?)
            .await
    }

    /// Replace the stored document with arbitrary JSON text.
    ///
    /// Used to seed legacy documents; `put_config` is the normal write path.
    pub async fn put_config_raw(
        &self,
        schema_version: u32,
        data: &str,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO class_config (id, schema_version, data, updated_at)
                 VALUES (1, ?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    schema_version = excluded.schema_version,
                    data = excluded.data,
                    updated_at = excluded.updated_at",
                libsql::params![i64::from(schema_version), data, Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(())
    }
}
