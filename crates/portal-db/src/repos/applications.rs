//! Application repository.

use portal_core::entities::Application;
use portal_core::enums::ApplicationStatus;

use crate::PortalDb;
use crate::error::DatabaseError;
use crate::helpers::{decode_record, encode_record};
use crate::repos::blobs::{NewBlob, insert_blob};

const TABLE: &str = "applications";

fn row_to_application(row: &libsql::Row) -> Result<Application, DatabaseError> {
    let id: String = row.get(0)?;
    let data: String = row.get(1)?;
    decode_record(TABLE, &id, &data)
}

impl PortalDb {
    /// Every application, newest first.
    pub async fn list_applications(&self) -> Result<Vec<Application>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, data FROM applications ORDER BY submitted_at DESC, rowid DESC",
                (),
            )
            .await?;
        let mut apps = Vec::new();
        while let Some(row) = rows.next().await? {
            apps.push(row_to_application(&row)?);
        }
        Ok(apps)
    }

    /// Applications in one status, newest first.
    pub async fn list_applications_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, data FROM applications WHERE status = ?1
                 ORDER BY submitted_at DESC, rowid DESC",
                [status.as_str()],
            )
            .await?;
        let mut apps = Vec::new();
        while let Some(row) = rows.next().await? {
            apps.push(row_to_application(&row)?);
        }
        Ok(apps)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no application has this id.
    pub async fn get_application(&self, id: &str) -> Result<Application, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT id, data FROM applications WHERE id = ?1", [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_application(&row)
    }

    pub async fn insert_application(&self, app: &Application) -> Result<(), DatabaseError> {
        self.insert_application_with_blobs(app, &[]).await
    }

    /// Insert `app` and the image blobs its proofs reference in one
    /// transaction. Nothing is written if any insert fails.
    pub async fn insert_application_with_blobs(
        &self,
        app: &Application,
        blobs: &[NewBlob],
    ) -> Result<(), DatabaseError> {
        let data = encode_record(app)?;
        let tx = self.conn().transaction().await?;
        let written = async {
            tx.execute(
                "INSERT INTO applications (id, email, status, submitted_at, data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    app.id.as_str(),
                    app.email.as_str(),
                    app.status.as_str(),
                    app.submitted_at.to_rfc3339(),
                    data
                ],
            )
            .await?;
            for blob in blobs {
                insert_blob(&tx, blob).await?;
            }
            Ok::<(), DatabaseError>(())
        }
        .await;
        finish(tx, written).await
    }

    /// Overwrite a stored application with `app`, matched by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no application has this id.
    pub async fn replace_application(&self, app: &Application) -> Result<(), DatabaseError> {
        self.replace_application_with_blobs(app, &[]).await
    }

    /// [`PortalDb::replace_application`] plus new image blobs, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no application has this id.
    pub async fn replace_application_with_blobs(
        &self,
        app: &Application,
        blobs: &[NewBlob],
    ) -> Result<(), DatabaseError> {
        let data = encode_record(app)?;
        let tx = self.conn().transaction().await?;
        let written = async {
            let changed = tx
                .execute(
                    "UPDATE applications SET email = ?1, status = ?2, submitted_at = ?3, data = ?4
                     WHERE id = ?5",
                    libsql::params![
                        app.email.as_str(),
                        app.status.as_str(),
                        app.submitted_at.to_rfc3339(),
                        data,
                        app.id.as_str()
                    ],
                )
                .await?;
            if changed == 0 {
                return Err(DatabaseError::NoResult);
            }
            for blob in blobs {
                insert_blob(&tx, blob).await?;
            }
            Ok::<(), DatabaseError>(())
        }
        .await;
        finish(tx, written).await
    }
}

/// Commit on success, roll back otherwise.
async fn finish(
    tx: libsql::Transaction,
    written: Result<(), DatabaseError>,
) -> Result<(), DatabaseError> {
    match written {
        Ok(()) => {
            tx.commit().await?;
            Ok(())
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}
