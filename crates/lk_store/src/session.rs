//! Session context: per-process key material established at login.
//!
//! An explicit handle owned by the application root and passed to the
//! login flow and the query layer — no global cache. Populated once per
//! session by signup or unlock, read thereafter; `lock` drops the key
//! material (the unlock key and the RSA private key both zeroize on drop).

use std::sync::Arc;

use rsa::{RsaPrivateKey, RsaPublicKey};
use tokio::sync::RwLock;

use lk_crypto::kdf::UnlockKey;

use crate::error::StoreError;

struct SessionInner {
    unlock_key: UnlockKey,
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

/// Cloneable session handle. Clones share the same slot.
#[derive(Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SessionInner>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the session after a successful signup or unlock. The write
    /// lock makes population a single-writer critical section; concurrent
    /// unlock attempts serialize here.
    pub async fn establish(&self, unlock_key: UnlockKey, private_key: RsaPrivateKey) {
        let public_key = RsaPublicKey::from(&private_key);
        let mut guard = self.inner.write().await;
        *guard = Some(SessionInner {
            unlock_key,
            private_key,
            public_key,
        });
    }

    pub async fn is_unlocked(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Drop the key material. Safe to call on an already-locked session.
    pub async fn lock(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }

    /// The vault public key, for entry encryption.
    pub async fn public_key(&self) -> Result<RsaPublicKey, StoreError> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .map(|inner| inner.public_key.clone())
            .ok_or(StoreError::SessionLocked)
    }

    /// The vault private key, for entry decryption.
    pub async fn private_key(&self) -> Result<RsaPrivateKey, StoreError> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .map(|inner| inner.private_key.clone())
            .ok_or(StoreError::SessionLocked)
    }

    /// The Account Unlock Key for this session.
    pub async fn unlock_key(&self) -> Result<UnlockKey, StoreError> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .map(|inner| inner.unlock_key.clone())
            .ok_or(StoreError::SessionLocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::test_key;
    use lk_crypto::kdf::derive_unlock_key;

    #[tokio::test]
    async fn session_locks_and_unlocks() {
        let session = Session::new();
        assert!(!session.is_unlocked().await);
        assert!(matches!(
            session.public_key().await,
            Err(StoreError::SessionLocked)
        ));

        let unlock_key = derive_unlock_key(
            "pw",
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            "saltSALTsaltSALTsaltSALTsaltSALT",
            "alice",
        )
        .unwrap();
        let private_key = test_key().clone();
        session.establish(unlock_key, private_key.clone()).await;

        assert!(session.is_unlocked().await);
        assert_eq!(session.private_key().await.unwrap(), private_key);
        assert_eq!(
            session.public_key().await.unwrap(),
            RsaPublicKey::from(&private_key)
        );
        assert!(session.unlock_key().await.is_ok());

        // Clones share the slot.
        let clone = session.clone();
        clone.lock().await;
        assert!(!session.is_unlocked().await);
        assert!(matches!(
            session.private_key().await,
            Err(StoreError::SessionLocked)
        ));
    }
}
