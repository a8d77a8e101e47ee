//! Password hashing and verification.
//!
//! Passwords are run through SHA-256 first, the digest is base64-encoded
//! and then fed to bcrypt. bcrypt silently truncates input at 72 bytes;
//! the pre-hash keeps every byte of a long passphrase significant while
//! staying within that limit (44 bytes of base64).
//!
//! The cost factor is pinned so that hashes written by older builds stay
//! verifiable by newer ones.

use base64ct::{Base64, Encoding};
use bcrypt::BcryptError;
use sha2::{Digest, Sha256};

/// Pinned bcrypt work factor. Do not follow `bcrypt::DEFAULT_COST`: a
/// bump there would change what new hashes look like, this stays fixed.
const BCRYPT_COST: u32 = 12;

/// SHA-256 + base64 pre-hash applied before bcrypt in both directions.
fn prehash(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    Base64::encode_string(&digest)
}

/// Hash a plaintext password for storage.
///
/// # Errors
///
/// Returns an error if bcrypt fails to produce a hash.
pub fn hash(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(prehash(password), BCRYPT_COST)
}

/// Check a candidate password against a stored hash.
///
/// A mismatch is `Ok(false)`, never an error. A malformed stored hash is
/// an error: it means the stored data is corrupt, not that the caller
/// sent the wrong password.
///
/// # Errors
///
/// Returns an error if `hashed` is not a well-formed bcrypt string.
pub fn verify(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(prehash(password), hashed)
}
