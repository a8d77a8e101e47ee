//! Stateless session tokens.
//!
//! Tokens are compact HMAC-signed JWTs carrying the account id as the
//! subject and an absolute expiry. Nothing is persisted: a token is
//! accepted purely on signature and expiry, so any number of tokens can
//! be outstanding for one account and none of them can be revoked other
//! than by the account disappearing.
//!
//! Verification failures are deliberately collapsed into a single
//! [`TokenError::Invalid`]: callers must not be able to tell a bad
//! signature from an expired token or a malformed subject, so the
//! distinguishing reason is only logged.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Lifetime of freshly issued tokens.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Error)]
pub enum TokenError {
    /// One undifferentiated outcome for every verification failure.
    #[error("could not validate credentials")]
    Invalid,
    /// Signing failed while issuing a token.
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: u64,
}

/// Signs and verifies session tokens with the process-wide secret.
///
/// Built once at startup from [`GlobalArgs`](crate::cli::globals::GlobalArgs)
/// and shared across request handlers.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, algorithm: Algorithm) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(algorithm);
        // Expiry is exact; the default 60s leeway would keep dead tokens alive.
        validation.leeway = 0;

        Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `subject` expiring `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, subject: i64, ttl: Duration) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: get_current_timestamp() + ttl.as_secs(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify a presented token and return the subject account id.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for a bad signature, malformed
    /// token, expired token, missing subject, or non-numeric subject.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            debug!("Token verification failed: {}", err);

            TokenError::Invalid
        })?;

        data.claims.sub.parse::<i64>().map_err(|err| {
            debug!("Token subject is not an account id: {}", err);

            TokenError::Invalid
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            &SecretString::from("a-test-signing-secret".to_string()),
            Algorithm::HS256,
        )
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let codec = codec();

        for subject in [1, 42, i64::MAX] {
            let token = codec.issue(subject, DEFAULT_TTL).unwrap();
            assert_eq!(codec.verify(&token).unwrap(), subject);
        }
    }

    #[test]
    fn tampering_invalidates_the_token() {
        let codec = codec();
        let token = codec.issue(7, DEFAULT_TTL).unwrap();

        // Flip the last character of the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(codec.verify(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn expired_token_is_invalid() {
        let codec = codec();
        let claims = json!({
            "sub": "7",
            "exp": get_current_timestamp() - 120,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"a-test-signing-secret"),
        )
        .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn missing_subject_is_invalid() {
        let codec = codec();
        let claims = json!({ "exp": get_current_timestamp() + 600 });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"a-test-signing-secret"),
        )
        .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn non_numeric_subject_is_invalid() {
        let codec = codec();
        let claims = json!({
            "sub": "alice",
            "exp": get_current_timestamp() + 600,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"a-test-signing-secret"),
        )
        .unwrap();

        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let codec = codec();
        let other = TokenCodec::new(
            &SecretString::from("a-different-secret".to_string()),
            Algorithm::HS256,
        );

        let token = other.issue(7, DEFAULT_TTL).unwrap();
        assert!(matches!(codec.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = codec();
        assert!(matches!(codec.verify(""), Err(TokenError::Invalid)));
        assert!(matches!(
            codec.verify("not-even-a-jwt"),
            Err(TokenError::Invalid)
        ));
    }
}
