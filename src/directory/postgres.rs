//! Postgres-backed account store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};

use super::{Account, AccountStore, Partition};

/// Account store over a Postgres pool, bound to one partition's table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
    table: String,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool, partition: Partition) -> Self {
        Self {
            pool,
            // Table name comes from the closed Partition enum, never
            // from user input, so interpolating it is safe.
            table: partition.table("users"),
        }
    }
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        is_active: row.get("is_active"),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        let query = format!(
            "SELECT id, username, email, password_hash, is_active FROM {} WHERE id = $1",
            self.table
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by id")?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Account>> {
        let query = format!(
            "SELECT id, username, email, password_hash, is_active FROM {} \
             WHERE username = $1 OR email = $1 LIMIT 1",
            self.table
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );

        let row = sqlx::query(&query)
            .bind(login)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by username or email")?;

        Ok(row.as_ref().map(account_from_row))
    }

    async fn exists(&self, login: &str) -> Result<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE username = $1 OR email = $1) AS exists",
            self.table
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = %query
        );

        let row = sqlx::query(&query)
            .bind(login)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to check account existence")?;

        Ok(row.get("exists"))
    }

    async fn insert(&self, username: &str, email: &str, password_hash: &str) -> Result<Account> {
        let query = format!(
            "INSERT INTO {} (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, username, email, password_hash, is_active",
            self.table
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = %query
        );

        let row = sqlx::query(&query)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("account store rejected the insert")?;

        Ok(account_from_row(&row))
    }

    async fn delete(&self, identifier: &str) -> Result<bool> {
        let query = format!(
            "DELETE FROM {} WHERE username = $1 OR email = $1",
            self.table
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = %query
        );

        let result = sqlx::query(&query)
            .bind(identifier)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete account")?;

        Ok(result.rows_affected() > 0)
    }
}
