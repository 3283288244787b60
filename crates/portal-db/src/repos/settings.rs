//! Local key/value settings.
//!
//! Each key is read and written independently; there is no grouping.

use crate::PortalDb;
use crate::error::DatabaseError;

/// Set while an admin session is active on this machine.
pub const ADMIN_AUTHENTICATED: &str = "admin_authenticated";
/// Remote endpoint chosen at runtime.
pub const BACKEND_URL: &str = "backend_url";

impl PortalDb {
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT value FROM settings WHERE key = ?1", [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .await?;
        Ok(())
    }

    /// Remove a setting. Removing an absent key is not an error.
    pub async fn clear_setting(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn()
            .execute("DELETE FROM settings WHERE key = ?1", [key])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_clear() {
        let db = PortalDb::open_local(":memory:").await.unwrap();
        assert_eq!(db.get_setting(BACKEND_URL).await.unwrap(), None);

        db.set_setting(BACKEND_URL, "http://a").await.unwrap();
        db.set_setting(BACKEND_URL, "http://b").await.unwrap();
        assert_eq!(
            db.get_setting(BACKEND_URL).await.unwrap().as_deref(),
            Some("http://b")
        );

        db.clear_setting(BACKEND_URL).await.unwrap();
        db.clear_setting(BACKEND_URL).await.unwrap();
        assert_eq!(db.get_setting(BACKEND_URL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let db = PortalDb::open_local(":memory:").await.unwrap();
        db.set_setting(ADMIN_AUTHENTICATED, "true").await.unwrap();
        db.clear_setting(BACKEND_URL).await.unwrap();
        assert_eq!(
            db.get_setting(ADMIN_AUTHENTICATED).await.unwrap().as_deref(),
            Some("true")
        );
    }
}
