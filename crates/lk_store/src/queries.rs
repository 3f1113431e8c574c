//! Category and password entry queries.
//!
//! Save paths encrypt through the entry cipher before touching the
//! database; list paths decrypt on the way out. The caller supplies keys
//! from the [`crate::Session`].

use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::warn;

use crate::db::Store;
use crate::error::StoreError;
use crate::models::{Category, PasswordEntry};

impl Store {
    // ── categories ───────────────────────────────────────────────────────────

    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    /// Insert (id 0) or update a category. Returns the category id.
    pub async fn save_category(&self, category: &Category) -> Result<i64, StoreError> {
        category.validate()?;
        if category.id == 0 {
            // RETURNING rather than last_insert_rowid: on the conflict
            // path SQLite leaves last-insert-rowid pointing at an older
            // row, which would hand back a stale id.
            let id = sqlx::query_scalar(
                "INSERT INTO categories (name) VALUES (?) \
                 ON CONFLICT (name) DO UPDATE SET name = excluded.name \
                 RETURNING id",
            )
            .bind(&category.name)
            .fetch_one(&self.pool)
            .await?;
            Ok(id)
        } else {
            sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
                .bind(&category.name)
                .bind(category.id)
                .execute(&self.pool)
                .await?;
            Ok(category.id)
        }
    }

    /// Delete a category; its entries become uncategorized (FK SET NULL).
    pub async fn delete_category(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("category {id}")));
        }
        Ok(())
    }

    // ── password entries ─────────────────────────────────────────────────────

    /// Load and decrypt all entries. An entry that fails to decrypt (e.g.
    /// renamed without re-encryption) is skipped and logged; the rest of
    /// the vault stays usable.
    pub async fn list_passwords(
        &self,
        private_key: &RsaPrivateKey,
    ) -> Result<Vec<PasswordEntry>, StoreError> {
        let rows: Vec<PasswordEntry> = sqlx::query_as(
            "SELECT id, category_id, name, email, username, password FROM passwords",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            match row.decrypt(private_key).await {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(id = row.id, name = %row.name, %err, "skipping undecryptable entry");
                }
            }
        }
        Ok(entries)
    }

    /// Validate, encrypt and persist an entry (insert when id is 0, update
    /// otherwise). Returns the entry id. The plaintext entry passed in is
    /// left untouched.
    pub async fn save_password(
        &self,
        entry: &PasswordEntry,
        public_key: &RsaPublicKey,
    ) -> Result<i64, StoreError> {
        entry.validate()?;
        let encrypted = entry.encrypt(public_key).await?;

        if entry.id == 0 {
            let result = sqlx::query(
                "INSERT INTO passwords (category_id, name, email, username, password) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(encrypted.category_id)
            .bind(&encrypted.name)
            .bind(&encrypted.email)
            .bind(&encrypted.username)
            .bind(&encrypted.password)
            .execute(&self.pool)
            .await?;
            Ok(result.last_insert_rowid())
        } else {
            sqlx::query(
                "UPDATE passwords SET category_id = ?, name = ?, email = ?, username = ?, \
                 password = ? WHERE id = ?",
            )
            .bind(encrypted.category_id)
            .bind(&encrypted.name)
            .bind(&encrypted.email)
            .bind(&encrypted.username)
            .bind(&encrypted.password)
            .bind(entry.id)
            .execute(&self.pool)
            .await?;
            Ok(entry.id)
        }
    }

    pub async fn delete_password(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM passwords WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("password entry {id}")));
        }
        Ok(())
    }
}
