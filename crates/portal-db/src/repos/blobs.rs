//! Image proof blobs.

use chrono::{DateTime, Utc};

use crate::PortalDb;
use crate::error::DatabaseError;
use crate::helpers::parse_datetime;

/// An uploaded image, addressed by its blob id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub id: String,
    pub mime: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// An image waiting to be written alongside the record that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlob {
    pub id: String,
    pub mime: String,
    pub data: Vec<u8>,
}

pub(crate) async fn insert_blob(
    conn: &libsql::Connection,
    blob: &NewBlob,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO blobs (id, mime, data, created_at) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![
            blob.id.as_str(),
            blob.mime.as_str(),
            libsql::Value::Blob(blob.data.clone()),
            Utc::now().to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl PortalDb {
    pub async fn put_blob(&self, id: &str, mime: &str, data: &[u8]) -> Result<(), DatabaseError> {
        let blob = NewBlob {
            id: id.to_string(),
            mime: mime.to_string(),
            data: data.to_vec(),
        };
        insert_blob(self.conn(), &blob).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no blob has this id.
    pub async fn get_blob(&self, id: &str) -> Result<StoredBlob, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, mime, data, created_at FROM blobs WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(StoredBlob {
            id: row.get(0)?,
            mime: row.get(1)?,
            data: row.get(2)?,
            created_at: parse_datetime(&row.get::<String>(3)?)?,
        })
    }
}
