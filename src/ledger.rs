use anyhow::Result;
use chrono::{Local, NaiveDateTime, SubsecRound};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

use crate::accounts::Role;
use crate::db::{decode_timestamp, DATE_FORMAT};

/// Columns shared by every query that reports punches alongside the owner's name.
/// Punches whose account is gone still appear, with an empty name.
pub(crate) const JOINED_SELECT: &str = "SELECT p.id AS id, COALESCE(a.name, '') AS account_name,
    p.timestamp AS timestamp, p.kind AS kind
    FROM punches p LEFT JOIN accounts a ON p.account_id = a.id";

#[derive(Debug, Clone, PartialEq)]
pub struct PunchEvent {
    pub id: i64,
    pub account_id: i64,
    pub timestamp: NaiveDateTime,
    pub kind: String,
}

impl<'r> FromRow<'r, SqliteRow> for PunchEvent {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let timestamp: String = row.try_get("timestamp")?;

        Ok(PunchEvent {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            timestamp: decode_timestamp(&timestamp)?,
            kind: row.try_get("kind")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPunch {
    pub id: i64,
    pub account_name: String,
    pub timestamp: NaiveDateTime,
    pub kind: String,
}

impl<'r> FromRow<'r, SqliteRow> for JoinedPunch {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let timestamp: String = row.try_get("timestamp")?;

        Ok(JoinedPunch {
            id: row.try_get("id")?,
            account_name: row.try_get("account_name")?,
            timestamp: decode_timestamp(&timestamp)?,
            kind: row.try_get("kind")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EmployeeRef {
    pub id: i64,
    pub name: String,
}

/// Stamps a new punch with the current local time, to the second.
/// The account id is stored as given; its existence is not checked.
pub async fn record(pool: &SqlitePool, account_id: i64, kind: &str) -> Result<PunchEvent> {
    let now = Local::now().naive_local().trunc_subsecs(0);
    record_at(pool, account_id, kind, now).await
}

pub(crate) async fn record_at(
    pool: &SqlitePool,
    account_id: i64,
    kind: &str,
    timestamp: NaiveDateTime,
) -> Result<PunchEvent> {
    let done = sqlx::query("INSERT INTO punches (account_id, timestamp, kind) VALUES (?, ?, ?)")
        .bind(account_id)
        .bind(timestamp.format(DATE_FORMAT).to_string())
        .bind(kind)
        .execute(pool)
        .await?;

    let event = PunchEvent {
        id: done.last_insert_rowid(),
        account_id,
        timestamp,
        kind: kind.to_string(),
    };
    tracing::info!(punch_id = event.id, account_id, kind, "punch recorded");

    Ok(event)
}

/// Newest first. Equal timestamps fall back to reverse insertion order.
pub async fn recent_for(pool: &SqlitePool, account_id: i64, limit: u32) -> Result<Vec<PunchEvent>> {
    let events = sqlx::query_as::<_, PunchEvent>(
        "SELECT id, account_id, timestamp, kind FROM punches
        WHERE account_id = ?
        ORDER BY timestamp DESC, id DESC
        LIMIT ?",
    )
    .bind(account_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn all_joined(pool: &SqlitePool, limit: u32) -> Result<Vec<JoinedPunch>> {
    let query = format!("{} ORDER BY p.timestamp DESC, p.id DESC LIMIT ?", JOINED_SELECT);
    let punches = sqlx::query_as::<_, JoinedPunch>(&query)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

    Ok(punches)
}

pub async fn list_employees(pool: &SqlitePool) -> Result<Vec<EmployeeRef>> {
    let employees = sqlx::query_as::<_, EmployeeRef>(
        "SELECT id, name FROM accounts WHERE role = ? ORDER BY name",
    )
    .bind(Role::Employee.as_str())
    .fetch_all(pool)
    .await?;

    Ok(employees)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM punches")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
