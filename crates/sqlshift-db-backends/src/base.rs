//! Base database backend traits.
//!
//! This module defines the [`DatabaseBackend`] trait that every backend
//! implements, and the [`Transaction`] trait for a unit of work pinned to a
//! single connection.

use sqlshift_core::{Driver, ShiftError, ShiftResult};
use sqlshift_db::{Row, Value};

/// Timestamp layout used when a driver receives datetimes as text.
pub const DATETIME_TEXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// An open transaction on one connection.
///
/// Obtained from [`DatabaseBackend::begin`]. It must be finished with
/// [`commit`](Transaction::commit) or [`rollback`](Transaction::rollback);
/// dropping an unfinished transaction rolls it back.
#[async_trait::async_trait]
pub trait Transaction: Send {
    /// Executes one parameterized statement. Returns the number of rows affected.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> ShiftResult<u64>;

    /// Executes a script of one or more statements without parameters.
    async fn execute_batch(&mut self, sql: &str) -> ShiftResult<()>;

    /// Executes a query and returns all result rows.
    async fn query(&mut self, sql: &str, params: &[Value]) -> ShiftResult<Vec<Row>>;

    /// Commits the transaction.
    async fn commit(self: Box<Self>) -> ShiftResult<()>;

    /// Rolls the transaction back.
    async fn rollback(self: Box<Self>) -> ShiftResult<()>;
}

/// The core trait for database backends.
///
/// All methods are async. Backends built on synchronous drivers (like
/// `rusqlite`) run their work in `spawn_blocking`.
#[async_trait::async_trait]
pub trait DatabaseBackend: Send + Sync {
    /// Returns the vendor name (e.g. "postgresql", "sqlite", "mysql").
    fn vendor(&self) -> &str;

    /// Returns the canonical driver of this backend.
    fn driver(&self) -> Driver;

    /// Checks that the database is reachable.
    async fn ping(&self) -> ShiftResult<()>;

    /// Executes one parameterized statement. Returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[Value]) -> ShiftResult<u64>;

    /// Executes a script of one or more statements without parameters.
    async fn execute_batch(&self, sql: &str) -> ShiftResult<()>;

    /// Executes a query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> ShiftResult<Vec<Row>>;

    /// Executes a query and returns exactly one row.
    async fn query_one(&self, sql: &str, params: &[Value]) -> ShiftResult<Row> {
        single_row(self.query(sql, params).await?)
    }

    /// Begins a transaction on a dedicated connection.
    async fn begin(&self) -> ShiftResult<Box<dyn Transaction>>;

    /// Releases pooled connections. The default does nothing.
    async fn close(&self) -> ShiftResult<()> {
        Ok(())
    }
}

/// Returns the only row of a result set.
pub fn single_row(rows: Vec<Row>) -> ShiftResult<Row> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        (None, _) => Err(ShiftError::Database("No rows returned".to_string())),
        (Some(_), n) => Err(ShiftError::Database(format!("Expected 1 row, got {n}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: i64) -> Row {
        Row::new(vec!["n".into()], vec![Value::Int(v)])
    }

    #[test]
    fn test_single_row() {
        assert_eq!(single_row(vec![row(1)]).unwrap().get::<i64>("n").unwrap(), 1);
        assert!(single_row(vec![]).is_err());
        let err = single_row(vec![row(1), row(2)]).unwrap_err();
        assert!(err.to_string().contains("got 2"));
    }
}
