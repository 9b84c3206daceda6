//! Bearer token generation and digests.
//!
//! Plain tokens are 32 random bytes rendered as hex. Only the SHA-256 digest
//! is persisted, so a leaked `auth_tokens` table cannot be replayed.

use std::fmt::Write;

use rand::Rng;
use sha2::{Digest, Sha256};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Hex SHA-256 digest used as the lookup key for a plain token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
