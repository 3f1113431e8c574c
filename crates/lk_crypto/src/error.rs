use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("OS entropy source unavailable")]
    Entropy,

    #[error("Invalid password hash encoding: {0}")]
    HashFormat(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Private key wrap failed: {0}")]
    Wrap(String),

    #[error("Private key unwrap failed (authentication tag mismatch or malformed PEM)")]
    Unwrap,

    #[error("Field encryption failed: {0}")]
    FieldEncrypt(String),

    #[error("Field decryption failed")]
    FieldDecrypt,
}
