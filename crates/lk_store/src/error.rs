use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] lk_crypto::CryptoError),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication failed")]
    Authentication,

    #[error("Secret key not found in the OS credential store — the account cannot be unlocked on this device")]
    SecretKeyMissing,

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Session is locked — unlock the vault first")]
    SessionLocked,

    #[error("Record not found: {0}")]
    NotFound(String),
}
