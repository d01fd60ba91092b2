//! Password hashing.
//!
//! Hashes are stored as `sha256$<salt>$<hex digest>` where the digest covers
//! `salt || password`.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}", SCHEME, salt, digest(&salt, password))
}

/// Returns true if `password` produces `stored` under the salt it carries.
pub fn password_matches(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt), Some(expected)) => digest(salt, password) == expected,
        _ => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
