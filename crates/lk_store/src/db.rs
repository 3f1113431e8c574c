//! Database abstraction over SQLite via sqlx.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};

use crate::error::StoreError;

/// Central store handle. Cheap to clone (pool is Arc internally).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path` and run all
    /// pending migrations.
    ///
    /// WAL journal mode and foreign-key enforcement are configured at
    /// connection time — NOT inside a migration, because SQLite forbids
    /// changing `journal_mode` inside a transaction and sqlx wraps every
    /// migration in one.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(opts).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        Ok(Self { pool })
    }

    // ── configurations helpers ───────────────────────────────────────────────

    /// Read one value from the `configurations` key/value table.
    pub async fn get_configuration(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar("SELECT value FROM configurations WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// The account's username, if an account has been provisioned. Used by
    /// the login view to decide between signup and unlock.
    pub async fn stored_username(&self) -> Result<Option<String>, StoreError> {
        self.get_configuration("username").await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::Store;
    use std::path::PathBuf;
    use uuid::Uuid;

    /// Fresh on-disk database under /tmp; the file is cheap and WAL needs
    /// a real path.
    pub(crate) async fn open_test_store() -> (Store, PathBuf) {
        let db_path = PathBuf::from(format!("/tmp/lk-store-test-{}.db", Uuid::new_v4()));
        let store = Store::open(&db_path).await.expect("open store");
        (store, db_path)
    }

    pub(crate) fn remove_test_db(db_path: &PathBuf) {
        let _ = std::fs::remove_file(db_path);
        let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
    }

    #[tokio::test]
    async fn fresh_database_has_no_account() {
        let (store, db_path) = open_test_store().await;
        assert_eq!(store.stored_username().await.unwrap(), None);
        assert_eq!(store.get_configuration("password").await.unwrap(), None);
        remove_test_db(&db_path);
    }
}
