//! OS credential store client.
//!
//! Two services, both keyed by username: one for the per-account device
//! Secret Key, one for the unlock-key salt. Neither value is ever written
//! to the database. The `CredentialStore` trait keeps the keyring behind a
//! seam so tests and headless environments can swap in the in-memory
//! implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;

use lk_crypto::random;

use crate::error::StoreError;

pub const SECRET_KEY_SERVICE: &str = "Latchkey Secret Key";
pub const SALT_SERVICE: &str = "Latchkey AUC Salt";

pub trait CredentialStore: Send + Sync {
    /// Fetch a secret; `Ok(None)` when no entry exists for the account.
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, service: &str, account: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a secret. Deleting an entry that does not exist is not an
    /// error (rollback paths call this unconditionally).
    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError>;
}

/// Keyring-backed store: Secret Service / Keychain / Credential Manager
/// depending on platform.
pub struct OsCredentialStore;

impl CredentialStore for OsCredentialStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, StoreError> {
        let entry = Entry::new(service, account)
            .map_err(|e| StoreError::CredentialStore(format!("keyring init: {e}")))?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::CredentialStore(format!("load secret: {e}"))),
        }
    }

    fn set(&self, service: &str, account: &str, value: &str) -> Result<(), StoreError> {
        let entry = Entry::new(service, account)
            .map_err(|e| StoreError::CredentialStore(format!("keyring init: {e}")))?;
        entry
            .set_password(value)
            .map_err(|e| StoreError::CredentialStore(format!("store secret: {e}")))
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        let entry = Entry::new(service, account)
            .map_err(|e| StoreError::CredentialStore(format!("keyring init: {e}")))?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::CredentialStore(format!("delete secret: {e}"))),
        }
    }
}

/// In-memory store for tests and headless environments.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(&(service.into(), account.into())).cloned())
    }

    fn set(&self, service: &str, account: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert((service.into(), account.into()), value.into());
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&(service.into(), account.into()));
        Ok(())
    }
}

/// Return the account's salt, generating and persisting a fresh one on
/// first use. Immutable once created.
pub fn find_or_create_salt(
    store: &dyn CredentialStore,
    username: &str,
) -> Result<String, StoreError> {
    if let Some(salt) = store.get(SALT_SERVICE, username)? {
        return Ok(salt);
    }
    let salt = random::generate_salt()?;
    store.set(SALT_SERVICE, username, &salt)?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.get(SECRET_KEY_SERVICE, "alice").unwrap(), None);
        store.set(SECRET_KEY_SERVICE, "alice", "value").unwrap();
        assert_eq!(
            store.get(SECRET_KEY_SERVICE, "alice").unwrap().as_deref(),
            Some("value")
        );
        store.delete(SECRET_KEY_SERVICE, "alice").unwrap();
        assert_eq!(store.get(SECRET_KEY_SERVICE, "alice").unwrap(), None);
        // Deleting again is fine.
        store.delete(SECRET_KEY_SERVICE, "alice").unwrap();
    }

    #[test]
    fn salt_is_created_once_then_reused() {
        let store = MemoryCredentialStore::default();
        let first = find_or_create_salt(&store, "alice").unwrap();
        assert_eq!(first.len(), random::SALT_LEN);
        let second = find_or_create_salt(&store, "alice").unwrap();
        assert_eq!(first, second);
        // Separate accounts get separate salts.
        assert_ne!(find_or_create_salt(&store, "bob").unwrap(), first);
    }
}
