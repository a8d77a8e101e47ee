//! # Portiere
//!
//! `portiere` is a user-account authentication service: register an
//! account, authenticate with a password, receive a bearer token, and
//! present that token on later requests until it expires or the account
//! is deleted.
//!
//! ## Credentials
//!
//! Passwords are hashed with bcrypt behind a SHA-256 pre-hash, so
//! passphrases longer than bcrypt's 72-byte limit keep their full
//! entropy. Verification runs at full cost on every login attempt,
//! including attempts against identifiers that do not exist, so response
//! timing does not reveal whether an account is registered.
//!
//! ## Sessions
//!
//! Session tokens are stateless HMAC-signed JWTs bound to the account's
//! immutable numeric id. Nothing is stored server-side: a token is valid
//! while its signature checks out, it has not expired, and the account
//! it names still exists. Deleting an account is therefore the only way
//! to cut off outstanding tokens early.
//!
//! ## Environment partitions
//!
//! Every storage operation is scoped to one environment partition
//! (`dev`/`test`/`prod`) chosen once at startup; the partition selects
//! the physical account table so test data can never leak into
//! production.

pub mod cli;
pub mod directory;
pub mod hasher;
pub mod portiere;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
