//! Full-ledger CSV export.
//!
//! The export is a stream of byte chunks: the header, then one chunk per page
//! of punches, newest first. Rows are read in keyset pages so an unbounded
//! ledger is never held in memory, and each page borrows a pooled connection
//! only while it is being fetched.
//!
//! Fields are written as-is, without quoting or escaping.

use bytes::Bytes;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use sqlx::sqlite::SqlitePool;

use crate::db::DATE_FORMAT;
use crate::errors::ExportError;
use crate::ledger::{JoinedPunch, JOINED_SELECT};

pub const HEADER: [&str; 3] = ["Funcionario", "Horario", "Tipo"];

const PAGE_SIZE: u32 = 256;

enum Page {
    First,
    After { timestamp: String, id: i64 },
    Done,
}

fn write_records<I, R>(records: I) -> Result<Bytes, ExportError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);

        for record in records {
            wtr.write_record(record)?;
        }
        wtr.flush()?;
    }

    Ok(Bytes::from(buf))
}

fn write_page(punches: &[JoinedPunch]) -> Result<Bytes, ExportError> {
    write_records(punches.iter().map(|p| {
        [
            p.account_name.clone(),
            p.timestamp.format(DATE_FORMAT).to_string(),
            p.kind.clone(),
        ]
    }))
}

pub fn export_all(
    pool: SqlitePool,
) -> impl Stream<Item = Result<Bytes, ExportError>> + Send + 'static {
    let header = stream::once(async { write_records([HEADER]) });

    let pages = stream::try_unfold(Page::First, move |page| {
        let pool = pool.clone();
        async move {
            let punches = match page {
                Page::Done => return Ok(None),
                Page::First => fetch_page(&pool, None).await?,
                Page::After { timestamp, id } => fetch_page(&pool, Some((timestamp, id))).await?,
            };

            let next = match punches.last() {
                Some(last) if punches.len() == PAGE_SIZE as usize => Page::After {
                    timestamp: last.timestamp.format(DATE_FORMAT).to_string(),
                    id: last.id,
                },
                Some(_) => Page::Done,
                None => return Ok(None),
            };

            Ok::<_, ExportError>(Some((punches, next)))
        }
    })
    .and_then(|punches| async move { write_page(&punches) });

    header.chain(pages)
}

async fn fetch_page(
    pool: &SqlitePool,
    after: Option<(String, i64)>,
) -> Result<Vec<JoinedPunch>, sqlx::Error> {
    match after {
        None => {
            let query = format!(
                "{} ORDER BY p.timestamp DESC, p.id DESC LIMIT ?",
                JOINED_SELECT
            );
            sqlx::query_as::<_, JoinedPunch>(&query)
                .bind(i64::from(PAGE_SIZE))
                .fetch_all(pool)
                .await
        }
        Some((timestamp, id)) => {
            let query = format!(
                "{} WHERE p.timestamp < ? OR (p.timestamp = ? AND p.id < ?)
                ORDER BY p.timestamp DESC, p.id DESC LIMIT ?",
                JOINED_SELECT
            );
            sqlx::query_as::<_, JoinedPunch>(&query)
                .bind(timestamp.clone())
                .bind(timestamp)
                .bind(id)
                .bind(i64::from(PAGE_SIZE))
                .fetch_all(pool)
                .await
        }
    }
}
