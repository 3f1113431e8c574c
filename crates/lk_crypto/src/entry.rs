//! RSA-OAEP field encryption for vault entries.
//!
//! Each confidential field is encrypted independently with SHA-256 OAEP,
//! using the entry's display name as the OAEP label, and hex-encoded for
//! storage. Renaming an entry without re-encrypting breaks decryption on
//! purpose: the label mismatch surfaces as `FieldDecrypt` instead of
//! mismatched plaintext, and callers must re-encrypt on rename.

use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;

/// Encrypt one field under `public_key`, labelled with the entry name.
pub fn encrypt_field(
    public_key: &RsaPublicKey,
    label: &str,
    plaintext: &str,
) -> Result<String, CryptoError> {
    let padding = Oaep::new_with_label::<Sha256, _>(label);
    let ciphertext = public_key
        .encrypt(&mut rand::rngs::OsRng, padding, plaintext.as_bytes())
        .map_err(|e| CryptoError::FieldEncrypt(e.to_string()))?;
    Ok(hex::encode(ciphertext))
}

/// Decrypt one hex-encoded field. The label must match the one used at
/// encryption time.
pub fn decrypt_field(
    private_key: &RsaPrivateKey,
    label: &str,
    ciphertext: &str,
) -> Result<String, CryptoError> {
    let decoded = hex::decode(ciphertext).map_err(|_| CryptoError::FieldDecrypt)?;
    let padding = Oaep::new_with_label::<Sha256, _>(label);
    let plaintext = private_key
        .decrypt(padding, &decoded)
        .map_err(|_| CryptoError::FieldDecrypt)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::FieldDecrypt)
}
