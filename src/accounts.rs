use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

use crate::errors::{AccountError, RoleParseError};

/// Seed credentials inserted when the store has no admin.
pub const DEFAULT_ADMIN_NAME: &str = "admin";
pub const DEFAULT_ADMIN_SECRET: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub secret: String,
    pub role: Role,
}

impl<'r> FromRow<'r, SqliteRow> for Account {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;

        Ok(Account {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            secret: row.try_get("secret")?,
            role: role
                .parse()
                .map_err(|e: RoleParseError| sqlx::Error::Decode(Box::new(e)))?,
        })
    }
}

/// Exact match on both name and secret. `None` means the pair is wrong, without saying which half.
#[tracing::instrument(name = "accounts::authenticate", skip_all, fields(account = %name))]
pub async fn authenticate(pool: &SqlitePool, name: &str, secret: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, name, secret, role FROM accounts WHERE name = ? AND secret = ? LIMIT 1",
    )
    .bind(name)
    .bind(secret)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

#[tracing::instrument(name = "accounts::create", skip_all, fields(account = %name))]
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    secret: &str,
    role: Role,
) -> Result<Account, AccountError> {
    if name.is_empty() || secret.is_empty() {
        return Err(AccountError::MissingField);
    }

    let inserted = sqlx::query("INSERT INTO accounts (name, secret, role) VALUES (?, ?, ?)")
        .bind(name)
        .bind(secret)
        .bind(role.as_str())
        .execute(pool)
        .await;

    match inserted {
        Ok(done) => {
            tracing::info!(account_id = done.last_insert_rowid(), %role, "account created");
            Ok(Account {
                id: done.last_insert_rowid(),
                name: name.to_string(),
                secret: secret.to_string(),
                role,
            })
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(AccountError::DuplicateName(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn create_employee(
    pool: &SqlitePool,
    name: &str,
    secret: &str,
) -> Result<Account, AccountError> {
    create(pool, name, secret, Role::Employee).await
}

/// Seeds the default admin if no admin exists. Returns whether a seed was inserted.
pub async fn bootstrap(pool: &SqlitePool) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let (admins,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts WHERE role = ?")
        .bind(Role::Admin.as_str())
        .fetch_one(&mut *tx)
        .await?;

    if admins > 0 {
        tx.commit().await?;
        return Ok(false);
    }

    sqlx::query("INSERT INTO accounts (name, secret, role) VALUES (?, ?, ?)")
        .bind(DEFAULT_ADMIN_NAME)
        .bind(DEFAULT_ADMIN_SECRET)
        .bind(Role::Admin.as_str())
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::warn!(account = DEFAULT_ADMIN_NAME, "seeded default admin account");
    Ok(true)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
