//! lk_crypto — Latchkey cryptographic primitives
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop.
//! - Secret comparison is constant-time.
//!
//! # Module layout
//! - `random`   — CSPRNG string generation (secret keys, salts, passwords)
//! - `hash`     — Argon2id password hashing for the local login gate
//! - `kdf`      — Account Unlock Key derivation (HKDF + PBKDF2 + device secret)
//! - `keypair`  — RSA-3072 vault key pair, AES-GCM private-key wrapping
//! - `entry`    — RSA-OAEP field encryption for vault entries
//! - `error`    — unified error type

pub mod entry;
pub mod error;
pub mod hash;
pub mod kdf;
pub mod keypair;
pub mod random;

pub use error::CryptoError;
