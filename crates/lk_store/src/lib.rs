//! lk_store — Latchkey vault storage, provisioning and session state
//!
//! # Encryption strategy
//! SQLite does NOT natively encrypt. Confidential entry fields (email,
//! password) are stored as RSA-OAEP ciphertext, hex-encoded; the vault's
//! private key is stored AES-GCM-wrapped under the Account Unlock Key.
//! Non-sensitive columns (ids, names, category links) stay plaintext to
//! allow efficient queries. The unlock key, the live private key and the
//! device secret never touch the database.
//!
//! # Stores
//! Two independent stores must agree about whether an account exists:
//! the SQLite database (password hash, wrapped private key) and the OS
//! credential store (device secret key, salt). The `auth` flows own the
//! compensation logic that keeps them consistent.

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod queries;
pub mod secrets;
pub mod session;

pub use db::Store;
pub use error::StoreError;
pub use session::Session;

/// Join a blocking task, resuming its panic on the caller's thread. Tasks
/// spawned here are never cancelled, so the only join failure is a panic.
pub(crate) async fn join_blocking<T>(handle: tokio::task::JoinHandle<T>) -> T {
    match handle.await {
        Ok(value) => value,
        Err(err) => std::panic::resume_unwind(err.into_panic()),
    }
}
