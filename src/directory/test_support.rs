//! In-memory account store for flow tests.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

use super::{Account, AccountStore};

/// Test double with knobs to simulate store failures.
#[derive(Debug, Default)]
pub(crate) struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
    next_id: AtomicI64,
    /// When set, every insert fails as if the store rejected the write.
    reject_inserts: AtomicBool,
    /// When set, deletes succeed but report that nothing was removed.
    swallow_deletes: AtomicBool,
}

impl MemoryAccountStore {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    pub(crate) fn reject_inserts(&self) {
        self.reject_inserts.store(true, Ordering::SeqCst);
    }

    pub(crate) fn swallow_deletes(&self) {
        self.swallow_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|account| account.id == id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .find(|account| account.username == login || account.email == login)
            .cloned())
    }

    async fn exists(&self, login: &str) -> Result<bool> {
        Ok(self.find_by_login(login).await?.is_some())
    }

    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<Account> {
        if self.reject_inserts.load(Ordering::SeqCst) {
            bail!("account store rejected the insert");
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts
            .iter()
            .any(|account| account.username == username || account.email == email)
        {
            bail!("duplicate username or email");
        }

        let account = Account {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
        };
        accounts.push(account.clone());

        Ok(account)
    }

    async fn delete(&self, identifier: &str) -> Result<bool> {
        if self.swallow_deletes.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut accounts = self.accounts.lock().unwrap();
        let before = accounts.len();
        accounts.retain(|account| account.username != identifier && account.email != identifier);

        Ok(accounts.len() < before)
    }
}
