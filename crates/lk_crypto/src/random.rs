//! Cryptographically secure random string generation.
//!
//! Every character is drawn uniformly from the target alphabet by
//! rejection sampling over OS randomness. Character sets:
//! - secret key: uppercase + digits, 36 characters
//! - salt: letters + digits, 32 characters
//! - generated passwords: letters + digits + punctuation, caller length

use rand::{rngs::OsRng, RngCore};

use crate::error::CryptoError;

const SECRET_KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SALT_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PASSWORD_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789~!@#%^&*-_+={}|";

pub const SECRET_KEY_LEN: usize = 36;
pub const SALT_LEN: usize = 32;

/// Generate the per-account device secret stored in the OS credential store.
pub fn generate_secret_key() -> Result<String, CryptoError> {
    generate(SECRET_KEY_ALPHABET, SECRET_KEY_LEN)
}

/// Generate the per-account salt fed into unlock-key derivation.
pub fn generate_salt() -> Result<String, CryptoError> {
    generate(SALT_ALPHABET, SALT_LEN)
}

/// Generate a random password of the requested length.
pub fn generate_password(length: usize) -> Result<String, CryptoError> {
    generate(PASSWORD_ALPHABET, length)
}

/// Uniform random string over `alphabet`. Bytes at or above the largest
/// multiple of the alphabet size are rejected to avoid modulo bias.
fn generate(alphabet: &[u8], length: usize) -> Result<String, CryptoError> {
    debug_assert!(!alphabet.is_empty() && alphabet.len() <= 256);
    let zone = 256 - (256 % alphabet.len());

    let mut out = String::with_capacity(length);
    let mut buf = [0u8; 64];
    while out.len() < length {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|_| CryptoError::Entropy)?;
        for &byte in &buf {
            if (byte as usize) < zone {
                out.push(alphabet[byte as usize % alphabet.len()] as char);
                if out.len() == length {
                    break;
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_has_expected_shape() {
        let key = generate_secret_key().unwrap();
        assert_eq!(key.len(), SECRET_KEY_LEN);
        assert!(key.bytes().all(|b| SECRET_KEY_ALPHABET.contains(&b)));
    }

    #[test]
    fn salt_has_expected_shape() {
        let salt = generate_salt().unwrap();
        assert_eq!(salt.len(), SALT_LEN);
        assert!(salt.bytes().all(|b| SALT_ALPHABET.contains(&b)));
    }

    #[test]
    fn password_respects_requested_length() {
        for len in [0, 1, 16, 128] {
            let password = generate_password(len).unwrap();
            assert_eq!(password.len(), len);
            assert!(password.bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn generated_values_do_not_collide() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1_000 {
            assert!(seen.insert(generate_salt().unwrap()));
        }
    }
}
