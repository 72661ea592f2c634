//! # sqlshift
//!
//! Versioned, file-based SQL migrations.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `sqlshift` to get the engine and the command line, or
//! depend on individual crates for finer-grained control.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sqlshift::core::{Driver, ShiftResult};
//! use sqlshift::db::Dialect;
//! use sqlshift::migrations::{discover, Runner, StatusTracker, UpOptions};
//!
//! # async fn run() -> ShiftResult<()> {
//! let backend = sqlshift::db_backends::connect(Driver::Sqlite, "app.db").await?;
//! let dialect = Dialect::new(Driver::Sqlite, "schema_migrations")?;
//! let runner = Runner::new(StatusTracker::new(backend, Arc::new(dialect)));
//!
//! let changesets = discover("./migrations", false)?;
//! runner.up(&changesets, UpOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

/// Error types, settings, drivers and logging.
pub use sqlshift_core as core;

/// Values, rows and SQL dialects for the bookkeeping table.
pub use sqlshift_db as db;

/// Database backends: `PostgreSQL`, `MySQL`, `SQLite`.
pub use sqlshift_db_backends as db_backends;

/// Changesets, status tracking and execution.
pub use sqlshift_migrations as migrations;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use sqlshift_cli as cli;
