//! Row models for the vault schema, plus the per-entry field cipher.

use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tokio::task;

use lk_crypto::entry::{decrypt_field, encrypt_field};

use crate::error::StoreError;
use crate::join_blocking;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("category name is required".into()));
        }
        Ok(())
    }
}

/// One credential record. At rest, `email` and `password` hold hex OAEP
/// ciphertext labelled with `name`; after [`PasswordEntry::decrypt`] they
/// hold plaintext. All other fields are cleartext in both forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PasswordEntry {
    pub id: i64,
    pub category_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl PasswordEntry {
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.email.is_empty() {
            missing.push("email");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "{} cannot be blank",
                missing.join(" and ")
            )));
        }
        Ok(())
    }

    /// Encrypt the two confidential fields concurrently, using the entry
    /// name as OAEP label. Returns a new entry; `self` stays plaintext.
    /// If either field fails, the first error wins and the other result
    /// is discarded — a half-encrypted entry is never returned.
    pub async fn encrypt(&self, public_key: &RsaPublicKey) -> Result<PasswordEntry, StoreError> {
        let email_task = {
            let (key, label, value) = (public_key.clone(), self.name.clone(), self.email.clone());
            task::spawn_blocking(move || encrypt_field(&key, &label, &value))
        };
        let password_task = {
            let (key, label, value) =
                (public_key.clone(), self.name.clone(), self.password.clone());
            task::spawn_blocking(move || encrypt_field(&key, &label, &value))
        };

        let (email, password) = tokio::try_join!(
            async { join_blocking(email_task).await.map_err(StoreError::from) },
            async { join_blocking(password_task).await.map_err(StoreError::from) },
        )?;

        Ok(PasswordEntry {
            email,
            password,
            ..self.clone()
        })
    }

    /// Structural inverse of [`PasswordEntry::encrypt`]. Fails with a
    /// decrypt error when the stored name no longer matches the label the
    /// fields were encrypted under (entry renamed without re-encryption).
    pub async fn decrypt(&self, private_key: &RsaPrivateKey) -> Result<PasswordEntry, StoreError> {
        let email_task = {
            let (key, label, value) = (private_key.clone(), self.name.clone(), self.email.clone());
            task::spawn_blocking(move || decrypt_field(&key, &label, &value))
        };
        let password_task = {
            let (key, label, value) =
                (private_key.clone(), self.name.clone(), self.password.clone());
            task::spawn_blocking(move || decrypt_field(&key, &label, &value))
        };

        let (email, password) = tokio::try_join!(
            async { join_blocking(email_task).await.map_err(StoreError::from) },
            async { join_blocking(password_task).await.map_err(StoreError::from) },
        )?;

        Ok(PasswordEntry {
            email,
            password,
            ..self.clone()
        })
    }
}
