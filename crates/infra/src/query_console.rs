//! Ad-hoc read-only SQL console.
//!
//! Gate: the text must hold exactly one statement, and its leading keyword must
//! be one of [`READ_ONLY_KEYWORDS`] (case-insensitive, leading whitespace
//! ignored). Accepted text then runs on a connection switched to
//! `PRAGMA query_only`, so a statement that gets past the keyword check still
//! cannot write.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, SqlitePool, TypeInfo, ValueRef};
use thiserror::Error;

pub const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "WITH"];

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(
        "only read-only queries (SELECT) are allowed: the console cannot modify inventory data"
    )]
    NotReadOnly,

    #[error("only a single read-only statement is allowed per query")]
    MultipleStatements,

    /// Raw message from the database.
    #[error("{0}")]
    Execution(String),
}

/// One result cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    /// Plain-text rendering (CSV export).
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Integer(v) => v.to_string(),
            Cell::Real(v) => v.to_string(),
            Cell::Text(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Recently executed queries, most recent first, without duplicates.
///
/// Re-running a query already in the list leaves its position unchanged.
#[derive(Debug, Clone)]
pub struct QueryHistory {
    entries: VecDeque<String>,
    limit: usize,
}

impl QueryHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if self.limit == 0 || self.entries.iter().any(|q| q == query) {
            return;
        }
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

/// True if `sql` starts with a read-only keyword.
pub fn is_read_only(sql: &str) -> bool {
    let keyword: String = sql
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    READ_ONLY_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&keyword))
}

/// True if `sql` holds at most one statement.
///
/// A `;` ends the statement unless it sits inside a string, a quoted
/// identifier or a comment. After the first terminator only whitespace,
/// comments and further `;` may follow.
pub fn is_single_statement(sql: &str) -> bool {
    let mut chars = sql.chars().peekable();
    let mut terminated = false;

    while let Some(c) = chars.next() {
        match c {
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            ';' => terminated = true,
            c if c.is_whitespace() => {}
            _ if terminated => return false,
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                // A doubled quote is an escaped quote and keeps the literal open.
                while let Some(c) = chars.next() {
                    if c == close {
                        if close != ']' && chars.peek() == Some(&close) {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
            }
            _ => {}
        }
    }
    true
}

#[derive(Debug)]
pub struct QueryConsole {
    pool: SqlitePool,
    history: Mutex<QueryHistory>,
}

impl QueryConsole {
    pub fn new(pool: SqlitePool, history_limit: usize) -> Self {
        Self {
            pool,
            history: Mutex::new(QueryHistory::new(history_limit)),
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.lock_history().entries()
    }

    /// A panic while holding the lock leaves the list itself intact.
    fn lock_history(&self) -> MutexGuard<'_, QueryHistory> {
        self.history.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("query history lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Run a read-only query and record it in the history on success.
    pub async fn run(&self, sql: &str) -> Result<QueryResult, QueryError> {
        if !is_read_only(sql) {
            tracing::warn!(query = sql, "refused non-read-only query");
            return Err(QueryError::NotReadOnly);
        }
        if !is_single_statement(sql) {
            tracing::warn!(query = sql, "refused multi-statement query");
            return Err(QueryError::MultipleStatements);
        }

        let (columns, rows) = self.fetch_read_only(sql).await?;
        let result = to_result(columns, &rows)?;

        self.lock_history().record(sql);

        tracing::info!(rows = result.rows.len(), "query executed");
        Ok(result)
    }

    /// Empty results are described separately so they keep their header.
    async fn fetch_read_only(&self, sql: &str) -> Result<(Vec<String>, Vec<SqliteRow>), QueryError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| QueryError::Execution(e.to_string()))?;

        sqlx::query("PRAGMA query_only = ON")
            .execute(&mut *conn)
            .await
            .map_err(|e| QueryError::Execution(e.to_string()))?;

        let fetched = match sqlx::query(sql).fetch_all(&mut *conn).await {
            Ok(rows) if rows.is_empty() => {
                let columns = match (&mut *conn).describe(sql).await {
                    Ok(described) => column_names(described.columns()),
                    Err(_) => vec![],
                };
                Ok((columns, rows))
            }
            Ok(rows) => Ok((column_names(rows[0].columns()), rows)),
            Err(err) => Err(err),
        };

        if let Err(err) = sqlx::query("PRAGMA query_only = OFF")
            .execute(&mut *conn)
            .await
        {
            tracing::error!("failed to reset query_only on pooled connection: {err}");
            conn.close_on_drop();
        }

        fetched.map_err(|e| QueryError::Execution(database_message(e)))
    }
}

fn column_names<C: Column>(columns: &[C]) -> Vec<String> {
    columns.iter().map(|c| c.name().to_string()).collect()
}

fn database_message(err: sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        other => other.to_string(),
    }
}

fn to_result(columns: Vec<String>, rows: &[SqliteRow]) -> Result<QueryResult, QueryError> {
    let rows = rows
        .iter()
        .map(|row| {
            (0..row.len())
                .map(|idx| cell(row, idx))
                .collect::<Result<Vec<Cell>, sqlx::Error>>()
        })
        .collect::<Result<Vec<Vec<Cell>>, sqlx::Error>>()
        .map_err(|e| QueryError::Execution(e.to_string()))?;

    Ok(QueryResult { columns, rows })
}

fn cell(row: &SqliteRow, idx: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }
    let type_name = raw.type_info().name().to_string();

    Ok(match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => Cell::Integer(row.try_get_unchecked(idx)?),
        "REAL" | "NUMERIC" => Cell::Real(row.try_get_unchecked(idx)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
            Cell::Text(format!("<{} bytes>", bytes.len()))
        }
        _ => Cell::Text(row.try_get_unchecked(idx)?),
    })
}
