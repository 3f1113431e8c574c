//! Password hashing for the local login gate.
//!
//! Argon2id with fixed parameters, encoded as
//! `$argon2id$v=19$<base64 salt>$<base64 digest>` (unpadded base64).
//! Verification re-derives with the stored salt and compares in constant
//! time. Any malformed or version-skewed encoding is a `HashFormat` error,
//! never a silent `false`.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

const ARGON_ITERATIONS: u32 = 12;
const ARGON_MEMORY_KIB: u32 = 64 * 1024;
const ARGON_LANES: u32 = 4;
const ARGON_DIGEST_LEN: usize = 32;
const SALT_LEN: usize = 16;

fn argon2() -> Argon2<'static> {
    let params = Params::new(
        ARGON_MEMORY_KIB,
        ARGON_ITERATIONS,
        ARGON_LANES,
        Some(ARGON_DIGEST_LEN),
    )
    .expect("Static Argon2 params are always valid");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash `password` with a fresh 16-byte salt into the self-describing
/// encoded form stored in the database.
pub fn hash_password(password: &str) -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| CryptoError::Entropy)?;

    let mut digest = [0u8; ARGON_DIGEST_LEN];
    argon2()
        .hash_password_into(password.as_bytes(), &salt, &mut digest)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(format!(
        "$argon2id$v={}${}${}",
        Version::V0x13 as u32,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(digest),
    ))
}

/// Verify `password` against an encoded hash produced by [`hash_password`].
/// A stored version that differs from the running version is a hard
/// `HashFormat` failure, not a fallback.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, CryptoError> {
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 5 || !parts[0].is_empty() {
        return Err(CryptoError::HashFormat(
            "expected $argon2id$v=N$salt$digest".into(),
        ));
    }
    if parts[1] != "argon2id" {
        return Err(CryptoError::HashFormat(format!(
            "unsupported algorithm {:?}",
            parts[1]
        )));
    }

    let version: u32 = parts[2]
        .strip_prefix("v=")
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| CryptoError::HashFormat("unparsable version field".into()))?;
    if version != Version::V0x13 as u32 {
        return Err(CryptoError::HashFormat(format!(
            "incompatible hash version {version}"
        )));
    }

    let salt = STANDARD_NO_PAD
        .decode(parts[3])
        .map_err(|_| CryptoError::HashFormat("salt is not valid base64".into()))?;
    let stored = STANDARD_NO_PAD
        .decode(parts[4])
        .map_err(|_| CryptoError::HashFormat("digest is not valid base64".into()))?;
    if stored.len() != ARGON_DIGEST_LEN {
        return Err(CryptoError::HashFormat(format!(
            "digest must be {ARGON_DIGEST_LEN} bytes, got {}",
            stored.len()
        )));
    }

    let mut digest = [0u8; ARGON_DIGEST_LEN];
    argon2()
        .hash_password_into(password.as_bytes(), &salt, &mut digest)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(digest.ct_eq(stored.as_slice()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let encoded = hash_password("Tr0ub4dor&3").unwrap();
        assert!(encoded.starts_with("$argon2id$v=19$"));
        assert!(verify_password("Tr0ub4dor&3", &encoded).unwrap());
        assert!(!verify_password("tr0ub4dor&3", &encoded).unwrap());
    }

    #[test]
    fn truncated_hash_is_a_format_error() {
        let encoded = hash_password("hunter2").unwrap();
        let truncated = &encoded[..encoded.len() - 10];
        assert!(matches!(
            verify_password("hunter2", truncated),
            Err(CryptoError::HashFormat(_))
        ));
    }

    #[test]
    fn version_skew_is_a_format_error() {
        let encoded = hash_password("hunter2").unwrap();
        let skewed = encoded.replace("v=19", "v=16");
        assert!(matches!(
            verify_password("hunter2", &skewed),
            Err(CryptoError::HashFormat(_))
        ));
    }

    #[test]
    fn garbage_is_a_format_error_not_a_match() {
        for bad in ["", "argon2id", "$argon2id$v=19$!!!$???", "$x$y$z$w$v$u"] {
            assert!(matches!(
                verify_password("pw", bad),
                Err(CryptoError::HashFormat(_))
            ));
        }
    }
}
