//! Account Unlock Key derivation.
//!
//! Three steps, in order:
//! 1. HKDF-SHA256 expands the stored salt (HKDF-salted with the username)
//!    into a 32-byte per-identity salt.
//! 2. PBKDF2-HMAC-SHA256 stretches the master password over that salt,
//!    100 000 rounds, 32 bytes out.
//! 3. The result is XORed with the first 32 bytes of the device-held
//!    secret key.
//!
//! The XOR combiner is the vault's inherited key format. Swapping it for a
//! second KDF pass would change the derived key for every existing vault,
//! so it stays.

use hkdf::Hkdf;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::CryptoError;

pub const UNLOCK_KEY_LEN: usize = 32;

const HKDF_INFO: &[u8] = b"latchkey-client";
const PBKDF2_ROUNDS: u32 = 100_000;

/// 32-byte Account Unlock Key. Held in the session only, never persisted.
/// Zeroized on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct UnlockKey([u8; UNLOCK_KEY_LEN]);

impl UnlockKey {
    pub fn as_bytes(&self) -> &[u8; UNLOCK_KEY_LEN] {
        &self.0
    }
}

/// Derive the Account Unlock Key. Deterministic: a pure function of the
/// four inputs. The secret key must carry at least 32 bytes of material.
pub fn derive_unlock_key(
    password: &str,
    secret_key: &str,
    salt: &str,
    username: &str,
) -> Result<UnlockKey, CryptoError> {
    if secret_key.len() < UNLOCK_KEY_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "secret key must be at least {UNLOCK_KEY_LEN} bytes, got {}",
            secret_key.len()
        )));
    }

    // Username as HKDF salt binds the derivation to the identity: the same
    // password + device secret yields a different key per username.
    let hk = Hkdf::<Sha256>::new(Some(username.as_bytes()), salt.as_bytes());
    let mut expanded_salt = [0u8; UNLOCK_KEY_LEN];
    hk.expand(HKDF_INFO, &mut expanded_salt)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; UNLOCK_KEY_LEN];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        &expanded_salt,
        PBKDF2_ROUNDS,
        &mut key,
    );

    // Possession binding: without the device secret, the stretched
    // password alone cannot reproduce the unlock key.
    for (k, s) in key.iter_mut().zip(secret_key.as_bytes()) {
        *k ^= s;
    }

    Ok(UnlockKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "Tr0ub4dor&3";
    const SECRET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const SALT: &str = "saltSALTsaltSALTsaltSALTsaltSALT";
    const USER: &str = "alice";

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_unlock_key(PASSWORD, SECRET, SALT, USER).unwrap();
        let b = derive_unlock_key(PASSWORD, SECRET, SALT, USER).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn every_input_changes_the_key() {
        let base = derive_unlock_key(PASSWORD, SECRET, SALT, USER).unwrap();
        let variants = [
            derive_unlock_key("Tr0ub4dor&4", SECRET, SALT, USER).unwrap(),
            derive_unlock_key(
                PASSWORD,
                "BBCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
                SALT,
                USER,
            )
            .unwrap(),
            derive_unlock_key(PASSWORD, SECRET, "tlasTLAStlasTLAStlasTLAStlasTLAS", USER)
                .unwrap(),
            derive_unlock_key(PASSWORD, SECRET, SALT, "bob").unwrap(),
        ];
        for variant in &variants {
            assert_ne!(base.as_bytes(), variant.as_bytes());
        }
    }

    #[test]
    fn short_secret_key_is_rejected() {
        assert!(matches!(
            derive_unlock_key(PASSWORD, "too-short", SALT, USER),
            Err(CryptoError::KeyDerivation(_))
        ));
    }
}
