//! # sqlshift-db
//!
//! Database-facing data types shared by the backends and the migration engine.
//!
//! ## Modules
//!
//! - [`value`] - [`Value`], the parameter/result type passed to and from backends
//! - [`row`] - [`Row`] and the [`FromValue`] conversion trait
//! - [`dialect`] - SQL generation for the bookkeeping table, per driver

// These clippy lints are intentionally allowed:
// - doc_markdown: product names (SQLite, PostgreSQL) appear unquoted in docs
// - result_large_err: ShiftError is the workspace-wide error type
// - missing_docs_in_private_items: statement accessors are self-describing
#![allow(clippy::doc_markdown)]
#![allow(clippy::result_large_err)]
#![allow(clippy::missing_docs_in_private_items)]

pub mod dialect;
pub mod row;
pub mod value;

pub use dialect::{Dialect, DialectRegistry, SqlProvider, Statement};
pub use row::{FromValue, Row};
pub use sqlshift_core::Driver;
pub use value::Value;
