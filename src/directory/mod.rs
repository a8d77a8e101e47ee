//! Account directory: identifier-based lookup over the external account
//! store, scoped to one environment partition per process.
//!
//! The store itself (Postgres in production) is reached through the
//! [`AccountStore`] trait so the flows depend only on the contract:
//! lookups by id or by unique field, an existence probe, insert, and
//! delete. Uniqueness of `username` and `email` is ultimately enforced
//! by the store's own constraints; callers treat a rejected insert as a
//! race with their own pre-check.

use anyhow::Result;
use async_trait::async_trait;
use std::{fmt, str::FromStr, sync::Arc};

pub mod postgres;

#[cfg(test)]
pub(crate) mod test_support;

/// Precomputed bcrypt hash with no corresponding account.
///
/// The login flow verifies candidates against this when no account
/// matched the identifier, so the not-found path burns the same bcrypt
/// cost as the found path and timing stays flat. Same cost factor as
/// real hashes; must never be stored for a real account.
pub const DUMMY_PASSWORD_HASH: &str =
    "$2b$12$N9qo8uLOickgx2ZMRZoMyeUq2ldGxad68LJZdL17lhWfjIgAcm3ZO";

/// Environment partition selecting the physical account table.
///
/// Resolved once at startup from `--env`; an unrecognized label never
/// gets past argument parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Dev,
    Test,
    Prod,
}

impl Partition {
    /// Map a logical table name to the partition's physical table.
    /// Production uses the unsuffixed name.
    #[must_use]
    pub fn table(self, base: &str) -> String {
        match self {
            Self::Prod => base.to_string(),
            Self::Dev => format!("{base}_dev"),
            Self::Test => format!("{base}_test"),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Test => "test",
            Self::Prod => "prod",
        }
    }
}

impl FromStr for Partition {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "dev" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            "prod" => Ok(Self::Prod),
            _ => Err(format!("invalid environment label: {label}")),
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored account. Deliberately not `Serialize`: responses use
/// dedicated projection types so `password_hash` can never leak out.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Contract with the external account store.
///
/// All operations are implicitly scoped to the active partition; each
/// implementation binds its partition at construction time.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by its immutable id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>>;

    /// Look up an account by exact username or email match. Uniqueness
    /// of both fields means at most one account can match.
    async fn find_by_login(&self, login: &str) -> Result<Option<Account>>;

    /// Whether an account with this username or email exists.
    async fn exists(&self, login: &str) -> Result<bool>;

    /// Persist a new account. The store rejects duplicate usernames or
    /// emails; callers surface that as a service-unavailable condition
    /// since their uniqueness pre-check already passed.
    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<Account>;

    /// Remove the account matching `identifier` (username or email).
    /// Returns whether a row was actually removed.
    async fn delete(&self, identifier: &str) -> Result<bool>;

    /// Resolve an identifier that may be an id, a username, or an email.
    ///
    /// A numeric identifier is tried as an id first; usernames made of
    /// digits still resolve through the fallback lookup.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>> {
        if let Ok(id) = identifier.parse::<i64>() {
            if let Some(account) = self.find_by_id(id).await? {
                return Ok(Some(account));
            }
        }

        self.find_by_login(identifier).await
    }
}

/// Shared handle to the process-wide account store.
pub type DynAccountStore = Arc<dyn AccountStore>;
