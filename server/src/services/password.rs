//! Password hashing and verification with Argon2id.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`). Both calls are
//! CPU-bound; async callers run them on the blocking pool.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash checked on logins for unknown emails so they cost the same Argon2
/// work as a real mismatch.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("spendy-no-such-account").ok());

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("password worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check `password` against a stored PHC string.
///
/// # Errors
///
/// Returns [`PasswordError::MalformedHash`] if `hash` cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Run a full verification against [`DUMMY_HASH`] and discard the outcome.
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// [`verify_against_dummy`] on the blocking pool.
///
/// # Errors
///
/// Fails only if the worker panics.
pub async fn verify_against_dummy_blocking(password: String) -> Result<(), PasswordError> {
    Ok(tokio::task::spawn_blocking(move || verify_against_dummy(&password)).await?)
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// See [`hash_password`]; also fails if the worker panics.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// See [`verify_password`]; also fails if the worker panics.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
