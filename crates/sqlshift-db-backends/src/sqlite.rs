//! SQLite database backend using `rusqlite`.
//!
//! [`SqliteBackend`] keeps one connection behind an async mutex and runs
//! every operation through `tokio::task::spawn_blocking`. A
//! [`Transaction`] holds the mutex guard for its whole lifetime, so nothing
//! else can interleave statements with it.
//!
//! Features:
//! - WAL mode for file databases, foreign keys enabled
//! - In-memory databases via the `:memory:` path (used throughout the tests)

use std::path::PathBuf;
use std::sync::Arc;

use sqlshift_core::{Driver, ShiftError, ShiftResult};
use sqlshift_db::{Row, Value};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::base::{DatabaseBackend, Transaction, DATETIME_TEXT_FORMAT};

const MEMORY: &str = ":memory:";

fn db_err(e: impl std::fmt::Display) -> ShiftError {
    ShiftError::Database(e.to_string())
}

fn join_err(e: tokio::task::JoinError) -> ShiftError {
    ShiftError::Database(format!("Task join error: {e}"))
}

/// A SQLite database backend.
pub struct SqliteBackend {
    path: PathBuf,
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteBackend {
    /// Opens a SQLite database at `path`; `:memory:` creates an in-memory one.
    pub fn open(path: impl Into<PathBuf>) -> ShiftResult<Self> {
        let path = path.into();
        let in_memory = path.to_str() == Some(MEMORY);
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| ShiftError::Connection(format!("SQLite open failed: {e}")))?;

        let pragmas = if in_memory {
            "PRAGMA foreign_keys=ON;"
        } else {
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"
        };
        conn.execute_batch(pragmas)
            .map_err(|e| ShiftError::Connection(format!("Failed to set pragmas: {e}")))?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database.
    pub fn memory() -> ShiftResult<Self> {
        Self::open(MEMORY)
    }

    /// Returns the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn bind_params(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> ShiftResult<()> {
        for (i, param) in params.iter().enumerate() {
            let idx = i + 1;
            match param {
                Value::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null),
                Value::Bool(b) => stmt.raw_bind_parameter(idx, b),
                Value::Int(v) => stmt.raw_bind_parameter(idx, v),
                Value::Float(v) => stmt.raw_bind_parameter(idx, v),
                Value::String(s) => stmt.raw_bind_parameter(idx, s.as_str()),
                Value::Bytes(b) => stmt.raw_bind_parameter(idx, b.as_slice()),
                Value::DateTime(dt) => stmt
                    .raw_bind_parameter(idx, dt.format(DATETIME_TEXT_FORMAT).to_string().as_str()),
            }
            .map_err(|e| ShiftError::Database(format!("Bind error: {e}")))?;
        }
        Ok(())
    }

    fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> Row {
        use rusqlite::types::ValueRef;

        let values = (0..column_names.len())
            .map(|i| match sqlite_row.get_ref(i).unwrap_or(ValueRef::Null) {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(v) => Value::Int(v),
                ValueRef::Real(v) => Value::Float(v),
                ValueRef::Text(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
                ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
            })
            .collect();
        Row::new(column_names.to_vec(), values)
    }

    fn run_execute(conn: &rusqlite::Connection, sql: &str, params: &[Value]) -> ShiftResult<u64> {
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        Self::bind_params(&mut stmt, params)?;
        let count = stmt.raw_execute().map_err(db_err)?;
        Ok(count as u64)
    }

    fn run_query(conn: &rusqlite::Connection, sql: &str, params: &[Value]) -> ShiftResult<Vec<Row>> {
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let column_names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        Self::bind_params(&mut stmt, params)?;

        let mut raw_rows = stmt.raw_query();
        let mut rows = Vec::new();
        while let Some(row) = raw_rows.next().map_err(db_err)? {
            rows.push(Self::convert_row(row, &column_names));
        }
        Ok(rows)
    }

    /// Runs every statement of a script, draining any rows it produces.
    fn run_batch(conn: &rusqlite::Connection, sql: &str) -> ShiftResult<()> {
        let mut batch = rusqlite::Batch::new(conn, sql);
        while let Some(mut stmt) = batch.next().map_err(db_err)? {
            let mut rows = stmt.raw_query();
            while rows.next().map_err(db_err)?.is_some() {}
        }
        Ok(())
    }

    async fn with_conn<T, F>(&self, f: F) -> ShiftResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> ShiftResult<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(join_err)?
    }
}

#[async_trait::async_trait]
impl DatabaseBackend for SqliteBackend {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    fn driver(&self) -> Driver {
        Driver::Sqlite
    }

    async fn ping(&self) -> ShiftResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(|e| ShiftError::Connection(e.to_string()))
        })
        .await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> ShiftResult<u64> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| Self::run_execute(conn, &sql, &params)).await
    }

    async fn execute_batch(&self, sql: &str) -> ShiftResult<()> {
        let sql = sql.to_string();
        self.with_conn(move |conn| Self::run_batch(conn, &sql)).await
    }

    async fn query(&self, sql: &str, params: &[Value]) -> ShiftResult<Vec<Row>> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_conn(move |conn| Self::run_query(conn, &sql, &params)).await
    }

    async fn begin(&self) -> ShiftResult<Box<dyn Transaction>> {
        let guard = self.conn.clone().lock_owned().await;
        let guard = tokio::task::spawn_blocking(move || {
            guard.execute_batch("BEGIN").map(|()| guard).map_err(db_err)
        })
        .await
        .map_err(join_err)??;

        Ok(Box::new(SqliteTransaction { guard: Some(guard) }))
    }
}

/// A transaction holding the connection lock until it finishes.
pub struct SqliteTransaction {
    guard: Option<OwnedMutexGuard<rusqlite::Connection>>,
}

impl SqliteTransaction {
    async fn run<T, F>(&mut self, f: F) -> ShiftResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> ShiftResult<T> + Send + 'static,
    {
        let guard = self
            .guard
            .take()
            .ok_or_else(|| ShiftError::Database("transaction already finished".to_string()))?;
        let (guard, result) = tokio::task::spawn_blocking(move || {
            let result = f(&guard);
            (guard, result)
        })
        .await
        .map_err(join_err)?;
        self.guard = Some(guard);
        result
    }

    async fn finish(mut self: Box<Self>, sql: &'static str) -> ShiftResult<()> {
        self.run(move |conn| conn.execute_batch(sql).map_err(db_err)).await?;
        // Finished; release the lock without the rollback in `Drop`.
        self.guard.take();
        Ok(())
    }
}

#[async_trait::async_trait]
impl Transaction for SqliteTransaction {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> ShiftResult<u64> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.run(move |conn| SqliteBackend::run_execute(conn, &sql, &params)).await
    }

    async fn execute_batch(&mut self, sql: &str) -> ShiftResult<()> {
        let sql = sql.to_string();
        self.run(move |conn| SqliteBackend::run_batch(conn, &sql)).await
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> ShiftResult<Vec<Row>> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.run(move |conn| SqliteBackend::run_query(conn, &sql, &params)).await
    }

    async fn commit(self: Box<Self>) -> ShiftResult<()> {
        self.finish("COMMIT").await
    }

    async fn rollback(self: Box<Self>) -> ShiftResult<()> {
        self.finish("ROLLBACK").await
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            if !guard.is_autocommit() {
                tracing::warn!("Rolling back unfinished SQLite transaction");
                guard.execute_batch("ROLLBACK").ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_execute_and_query() {
        let db = SqliteBackend::memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);")
            .await
            .unwrap();
        let n = db
            .execute("INSERT INTO t (name) VALUES (?)", &[Value::from("alice")])
            .await
            .unwrap();
        assert_eq!(n, 1);

        let row = db.query_one("SELECT id, name FROM t", &[]).await.unwrap();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("name").unwrap(), "alice");
    }

    #[tokio::test]
    async fn test_batch_with_select_statement() {
        let db = SqliteBackend::memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER);\nSELECT 1;\nINSERT INTO t VALUES (7);")
            .await
            .unwrap();
        let rows = db.query("SELECT id FROM t", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_datetime_binds_as_sortable_text() {
        let db = SqliteBackend::memory().unwrap();
        db.execute_batch("CREATE TABLE t (at DATETIME);").await.unwrap();
        let at = chrono::NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_hms_micro_opt(10, 24, 30, 5)
            .unwrap();
        db.execute("INSERT INTO t VALUES (?)", &[Value::DateTime(at)])
            .await
            .unwrap();

        let row = db.query_one("SELECT at FROM t", &[]).await.unwrap();
        assert_eq!(row.get::<String>("at").unwrap(), "2025-11-05 10:24:30.000005");
        assert_eq!(row.get::<chrono::NaiveDateTime>("at").unwrap(), at);
    }

    #[tokio::test]
    async fn test_transaction_commit_and_rollback() {
        let db = SqliteBackend::memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER);").await.unwrap();

        let mut tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO t VALUES (?)", &[Value::Int(1)]).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO t VALUES (?)", &[Value::Int(2)]).await.unwrap();
        let seen = tx.query("SELECT COUNT(*) AS n FROM t", &[]).await.unwrap();
        assert_eq!(seen[0].get::<i64>("n").unwrap(), 2);
        tx.rollback().await.unwrap();

        let row = db.query_one("SELECT COUNT(*) AS n FROM t", &[]).await.unwrap();
        assert_eq!(row.get::<i64>("n").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let db = SqliteBackend::memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER);").await.unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            tx.execute_batch("INSERT INTO t VALUES (1);").await.unwrap();
        }

        let row = db.query_one("SELECT COUNT(*) AS n FROM t", &[]).await.unwrap();
        assert_eq!(row.get::<i64>("n").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_batch_inside_transaction() {
        let db = SqliteBackend::memory().unwrap();
        let mut tx = db.begin().await.unwrap();
        tx.execute_batch("CREATE TABLE ok_table (id INTEGER);").await.unwrap();
        let err = tx.execute_batch("CREATE TABL broken;").await.unwrap_err();
        assert!(matches!(err, ShiftError::Database(_)));
        tx.rollback().await.unwrap();

        let rows = db
            .query("SELECT name FROM sqlite_master WHERE name = 'ok_table'", &[])
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let db = SqliteBackend::open(&path).unwrap();
        db.ping().await.unwrap();
        assert_eq!(db.path(), &path);
        assert!(path.exists());
    }
}
