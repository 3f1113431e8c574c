//! Vault key pair generation and private-key wrapping.
//!
//! The private key exists in three forms: the live `RsaPrivateKey`
//! (session memory only), PKCS#1 PEM (transient, during wrap/unwrap), and
//! the wrapped blob persisted in the database.
//!
//! Wrapped wire format, AES-256-GCM under the 32-byte unlock key:
//!   [ nonce (12 bytes) | ciphertext + tag ]     (empty AAD)

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng as AeadOsRng},
    Aes256Gcm, Nonce,
};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::kdf::UNLOCK_KEY_LEN;

pub const RSA_BITS: usize = 3072;
const NONCE_LEN: usize = 12;

/// Generate the vault's RSA-3072 private key. CPU-heavy; call sites run
/// this on a blocking thread.
pub fn generate_private_key() -> Result<RsaPrivateKey, CryptoError> {
    RsaPrivateKey::new(&mut rand::rngs::OsRng, RSA_BITS)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))
}

/// PEM-encode `key` and encrypt it under the unlock key with a fresh
/// nonce. The `&[u8; 32]` parameter makes the AES key-size precondition a
/// compile-time fact rather than a runtime check.
pub fn wrap_private_key(
    key: &RsaPrivateKey,
    unlock_key: &[u8; UNLOCK_KEY_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CryptoError::Wrap(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(unlock_key)
        .map_err(|e| CryptoError::Wrap(e.to_string()))?;
    let nonce = Aes256Gcm::generate_nonce(&mut AeadOsRng);
    let ciphertext = cipher
        .encrypt(&nonce, pem.as_bytes())
        .map_err(|e| CryptoError::Wrap(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt a wrapped blob and parse the PEM back into a private key.
///
/// The GCM tag check fails deterministically under a wrong unlock key, so
/// `Unwrap` here is the primary "wrong master password" signal — callers
/// must treat it as recoverable, not as corruption.
pub fn unwrap_private_key(
    wrapped: &[u8],
    unlock_key: &[u8; UNLOCK_KEY_LEN],
) -> Result<RsaPrivateKey, CryptoError> {
    if wrapped.len() < NONCE_LEN {
        return Err(CryptoError::Unwrap);
    }
    let (nonce, ciphertext) = wrapped.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(unlock_key).map_err(|_| CryptoError::Unwrap)?;
    let pem = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Unwrap)?,
    );

    let pem = core::str::from_utf8(&pem).map_err(|_| CryptoError::Unwrap)?;
    RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| CryptoError::Unwrap)
}
