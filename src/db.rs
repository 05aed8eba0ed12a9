use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Storage format of every timestamp. Text in this format sorts chronologically.
pub static DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn decode_timestamp(raw: &str) -> Result<NaiveDateTime, sqlx::Error> {
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        secret TEXT NOT NULL,
        role TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS punches (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER NOT NULL REFERENCES accounts(id),
        timestamp TEXT NOT NULL,
        kind TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS punches_account_timestamp
        ON punches(account_id, timestamp)",
];

pub async fn setup_pool(database_url: &str) -> Result<SqlitePool> {
    // The punches -> accounts reference is declarative only; writes never check it.
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(false);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Could not open database at {}", database_url))?;

    Ok(pool)
}

/// Creates the tables if they don't already exist. Safe to run on every start.
pub async fn setup_db(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to create schema")?;
    }
    tracing::debug!("schema ready");

    Ok(())
}
