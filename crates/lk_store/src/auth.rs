//! Account provisioning and unlock.
//!
//! Both flows end with an established session. Signup mutates two
//! independent stores — the SQLite database and the OS credential store —
//! so every step that leaves material behind has a compensating action:
//! the credential store must never hold secrets for an account the
//! database does not know about, and vice versa.
//!
//! Callers see only coarse errors (validation / authentication /
//! infrastructure); stage-level detail goes to the log, never into the
//! returned error, so the unlock flow cannot be used as an oracle.

use tokio::task;
use tracing::{error, info, warn};

use lk_crypto::{hash, kdf, keypair, random};

use crate::db::Store;
use crate::error::StoreError;
use crate::join_blocking;
use crate::secrets::{self, CredentialStore, SALT_SERVICE, SECRET_KEY_SERVICE};
use crate::session::Session;

pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), StoreError> {
        if self.username.trim().is_empty() {
            return Err(StoreError::Validation("username is required".into()));
        }
        if self.password.is_empty() {
            return Err(StoreError::Validation("password is required".into()));
        }
        Ok(())
    }
}

/// Create the account: hash the password, provision the device secret and
/// salt in the credential store, generate and wrap the vault key pair, and
/// commit everything to the database in one transaction.
pub async fn sign_up(
    store: &Store,
    credentials: &dyn CredentialStore,
    session: &Session,
    creds: &Credentials,
) -> Result<(), StoreError> {
    creds.validate()?;

    let hashed = {
        let password = creds.password.clone();
        join_blocking(task::spawn_blocking(move || hash::hash_password(&password))).await?
    };

    let mut tx = store.pool.begin().await?;
    sqlx::query("INSERT INTO configurations (key, value) VALUES ('username', ?), ('password', ?)")
        .bind(&creds.username)
        .bind(&hashed)
        .execute(&mut *tx)
        .await?;

    let secret_key = random::generate_secret_key()?;
    if let Err(err) = credentials.set(SECRET_KEY_SERVICE, &creds.username, &secret_key) {
        error!(%err, "failed to store secret key, aborting signup");
        if let Err(rollback_err) = tx.rollback().await {
            error!(%rollback_err, "rollback failed while aborting signup");
        }
        return Err(err);
    }

    // The credential store now holds material for this account; every
    // failure from here on must remove it again.
    let protected = async {
        let salt = secrets::find_or_create_salt(credentials, &creds.username)?;
        let unlock_key =
            kdf::derive_unlock_key(&creds.password, &secret_key, &salt, &creds.username)?;
        let private_key =
            join_blocking(task::spawn_blocking(keypair::generate_private_key)).await?;
        let wrapped = keypair::wrap_private_key(&private_key, unlock_key.as_bytes())?;
        sqlx::query("INSERT INTO configurations (key, value) VALUES ('encrypted_private_key', ?)")
            .bind(hex::encode(&wrapped))
            .execute(&mut *tx)
            .await?;
        Ok::<_, StoreError>((unlock_key, private_key))
    }
    .await;

    let (unlock_key, private_key) = match protected {
        Ok(keys) => keys,
        Err(err) => {
            error!(%err, "signup failed after secret provisioning, compensating");
            if let Err(rollback_err) = tx.rollback().await {
                error!(%rollback_err, "rollback failed during signup compensation");
            }
            scrub_credentials(credentials, &creds.username);
            return Err(err);
        }
    };

    if let Err(err) = tx.commit().await {
        error!(%err, "signup commit failed, compensating");
        scrub_credentials(credentials, &creds.username);
        return Err(err.into());
    }

    session.establish(unlock_key, private_key).await;
    info!(username = %creds.username, "account provisioned");
    Ok(())
}

/// Unlock an existing account: verify the password, re-derive the unlock
/// key from the device secret, unwrap the private key and populate the
/// session. Mismatch and missing-record cases collapse to a generic
/// authentication failure.
pub async fn unlock(
    store: &Store,
    credentials: &dyn CredentialStore,
    session: &Session,
    creds: &Credentials,
) -> Result<(), StoreError> {
    creds.validate()?;

    let stored_hash = store
        .get_configuration("password")
        .await?
        .ok_or(StoreError::Authentication)?;
    let matches = {
        let password = creds.password.clone();
        join_blocking(task::spawn_blocking(move || {
            hash::verify_password(&password, &stored_hash)
        }))
        .await?
    };
    if !matches {
        info!("password verification failed");
        return Err(StoreError::Authentication);
    }

    // Absence of the device secret is a configuration error, not an
    // authentication one: without it the account is unusable on this
    // device and there is no self-healing.
    let secret_key = credentials
        .get(SECRET_KEY_SERVICE, &creds.username)?
        .ok_or(StoreError::SecretKeyMissing)?;
    let salt = secrets::find_or_create_salt(credentials, &creds.username)?;
    let unlock_key = kdf::derive_unlock_key(&creds.password, &secret_key, &salt, &creds.username)?;

    let wrapped_hex = store
        .get_configuration("encrypted_private_key")
        .await?
        .ok_or(StoreError::Authentication)?;
    let wrapped = hex::decode(wrapped_hex).map_err(|err| {
        error!(%err, "stored private key is not valid hex");
        StoreError::Authentication
    })?;
    let private_key =
        keypair::unwrap_private_key(&wrapped, unlock_key.as_bytes()).map_err(|err| {
            info!(%err, "private key unwrap rejected");
            StoreError::Authentication
        })?;

    session.establish(unlock_key, private_key).await;
    info!(username = %creds.username, "vault unlocked");
    Ok(())
}

/// Best-effort removal of the account's credential-store material during
/// signup compensation.
fn scrub_credentials(store: &dyn CredentialStore, username: &str) {
    for service in [SECRET_KEY_SERVICE, SALT_SERVICE] {
        if let Err(err) = store.delete(service, username) {
            warn!(service, %err, "failed to remove credential during rollback");
        }
    }
}
