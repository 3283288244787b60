//! Invite code repository.
//!
//! `application_id` and `code` are both UNIQUE, so a second code for the same
//! application cannot be inserted even if a caller skips the lookup.

use portal_core::entities::InviteCode;

use crate::PortalDb;
use crate::error::DatabaseError;
use crate::helpers::{decode_record, encode_record};

const TABLE: &str = "invite_codes";

fn row_to_code(row: &libsql::Row) -> Result<InviteCode, DatabaseError> {
    let id: String = row.get(0)?;
    let data: String = row.get(1)?;
    let mut code: InviteCode = decode_record(TABLE, &id, &data)?;
    // `used` is flipped in place without rewriting `data`.
    code.used = row.get::<i64>(2)? != 0;
    Ok(code)
}

impl PortalDb {
    pub async fn list_codes(&self) -> Result<Vec<InviteCode>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, data, used FROM invite_codes ORDER BY generated_at DESC, rowid DESC",
                (),
            )
            .await?;
        let mut codes = Vec::new();
        while let Some(row) = rows.next().await? {
            codes.push(row_to_code(&row)?);
        }
        Ok(codes)
    }

    pub async fn find_code_for_application(
        &self,
        application_id: &str,
    ) -> Result<Option<InviteCode>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, data, used FROM invite_codes WHERE application_id = ?1",
                [application_id],
            )
            .await?;
        rows.next().await?.map(|row| row_to_code(&row)).transpose()
    }

    /// Exact, case-sensitive lookup. Callers normalize first.
    pub async fn find_code(&self, code: &str) -> Result<Option<InviteCode>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, data, used FROM invite_codes WHERE code = ?1",
                [code],
            )
            .await?;
        rows.next().await?.map(|row| row_to_code(&row)).transpose()
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT 1 FROM invite_codes WHERE code = ?1", [code])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn insert_code(&self, code: &InviteCode) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO invite_codes (id, code, email, application_id, used, generated_at, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    code.id.as_str(),
                    code.code.as_str(),
                    code.email.as_str(),
                    code.application_id.as_str(),
                    i64::from(code.used),
                    code.generated_at.to_rfc3339(),
                    encode_record(code)?
                ],
            )
            .await?;
        Ok(())
    }

    /// Set `used`. Never clears it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no code has this id.
    pub async fn mark_code_used(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute("UPDATE invite_codes SET used = 1 WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    async fn test_db() -> PortalDb {
        PortalDb::open_local(":memory:").await.unwrap()
    }

    fn code(id: &str, app_id: &str, code: &str) -> InviteCode {
        InviteCode {
            id: id.into(),
            code: code.into(),
            email: "ada@example.com".into(),
            application_id: app_id.into(),
            used: false,
            generated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_both_ways() {
        let db = test_db().await;
        let c = code("c00000001", "app000001", "TCP-ABC123");
        db.insert_code(&c).await.unwrap();

        assert_eq!(db.find_code("TCP-ABC123").await.unwrap(), Some(c.clone()));
        assert_eq!(db.find_code_for_application("app000001").await.unwrap(), Some(c));
        assert!(db.code_exists("TCP-ABC123").await.unwrap());
        assert!(!db.code_exists("TCP-ZZZZZZ").await.unwrap());
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let db = test_db().await;
        db.insert_code(&code("c00000001", "app000001", "TCP-ABC123"))
            .await
            .unwrap();
        assert_eq!(db.find_code("tcp-abc123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_code_for_same_application_is_refused() {
        let db = test_db().await;
        db.insert_code(&code("c00000001", "app000001", "TCP-AAAAAA"))
            .await
            .unwrap();
        assert!(
            db.insert_code(&code("c00000002", "app000001", "TCP-BBBBBB"))
                .await
                .is_err()
        );
        assert_eq!(db.list_codes().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mark_used_is_reflected_on_read() {
        let db = test_db().await;
        db.insert_code(&code("c00000001", "app000001", "TCP-ABC123"))
            .await
            .unwrap();
        db.mark_code_used("c00000001").await.unwrap();
        db.mark_code_used("c00000001").await.unwrap();

        let stored = db.find_code("TCP-ABC123").await.unwrap().unwrap();
        assert!(stored.used);
        assert!(db.list_codes().await.unwrap()[0].used);
    }

    #[tokio::test]
    async fn mark_used_missing_is_no_result() {
        let db = test_db().await;
        assert!(matches!(
            db.mark_code_used("missing").await,
            Err(DatabaseError::NoResult)
        ));
    }
}
