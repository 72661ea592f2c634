//! # sqlshift-db-backends
//!
//! Database backend implementations for sqlshift. Each backend executes SQL
//! scripts and parameterized statements and hands out transactions pinned to
//! one connection.
//!
//! Supported backends, each behind a cargo feature:
//! - `SQLite` (`sqlite`, default)
//! - `PostgreSQL` (`postgres`)
//! - `MySQL` (`mysql`)
//!
//! SQL Server has a dialect in `sqlshift-db` but no driver here.

// These clippy lints are intentionally allowed:
// - doc_markdown: product names (SQLite, PostgreSQL) appear unquoted in docs
// - result_large_err: ShiftError is the workspace-wide error type
// - cast_possible_truncation / cast_sign_loss: driver row counts are usize
// - significant_drop_tightening: connection guards live for the whole operation
#![allow(clippy::doc_markdown)]
#![allow(clippy::result_large_err)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::significant_drop_tightening)]

use std::sync::Arc;

use sqlshift_core::{Driver, ShiftError, ShiftResult};

pub mod base;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgresql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use base::{DatabaseBackend, Transaction};
#[cfg(feature = "mysql")]
pub use mysql::MySqlBackend;
#[cfg(feature = "postgres")]
pub use postgresql::PostgresBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;

/// Opens the backend for `driver` and checks that it is reachable.
///
/// Drivers whose cargo feature is disabled, and SQL Server, yield
/// [`ShiftError::Connection`].
pub async fn connect(driver: Driver, dsn: &str) -> ShiftResult<Arc<dyn DatabaseBackend>> {
    tracing::debug!("Connecting to {driver} database");
    let backend: Arc<dyn DatabaseBackend> = match driver {
        #[cfg(feature = "sqlite")]
        Driver::Sqlite => Arc::new(SqliteBackend::open(dsn)?),
        #[cfg(feature = "postgres")]
        Driver::Postgres => Arc::new(PostgresBackend::connect(dsn)?),
        #[cfg(feature = "mysql")]
        Driver::MySql => Arc::new(MySqlBackend::from_url(dsn)?),
        #[allow(unreachable_patterns)]
        other => {
            let _ = dsn;
            return Err(ShiftError::Connection(format!(
                "no {other} driver is available in this build"
            )));
        }
    };
    backend.ping().await?;
    Ok(backend)
}

/// Returns `true` when this build can connect to `driver`.
pub const fn is_supported(driver: Driver) -> bool {
    match driver {
        Driver::Sqlite => cfg!(feature = "sqlite"),
        Driver::Postgres => cfg!(feature = "postgres"),
        Driver::MySql => cfg!(feature = "mysql"),
        Driver::MsSql => false,
    }
}
