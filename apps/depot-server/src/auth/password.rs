//! One-way password hashing and verification.
//!
//! Stored values have the form `salt_hex$digest_hex` with a fresh random
//! salt per hash, so hashing the same password twice never produces the
//! same output. The concrete transform is an implementation detail behind
//! `hash_password` / `verify_password`.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_with_salt(&salt, password);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored hash. Fails closed: any malformed
/// stored value or mismatch returns false.
pub fn verify_password(stored: &str, password: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    let actual = digest_with_salt(&salt, password);
    actual.as_slice() == expected.as_slice()
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
