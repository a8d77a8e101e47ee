use crate::directory::Partition;
use jsonwebtoken::Algorithm;
use secrecy::SecretString;

/// Process-wide configuration, built once at startup and never mutated.
/// Handlers receive what they need through the server wiring; nothing
/// reads ambient environment state after this is constructed.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret: SecretString,
    pub algorithm: Algorithm,
    pub partition: Partition,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret: SecretString, algorithm: Algorithm, partition: Partition) -> Self {
        Self {
            secret,
            algorithm,
            partition,
        }
    }
}
