//! # sqlshift-core
//!
//! Foundation types shared by every sqlshift crate.
//!
//! ## Modules
//!
//! - [`error`] - Error type, result alias and run direction
//! - [`driver`] - Canonical database driver identifiers and alias folding
//! - [`settings`] - Settings structs and defaults
//! - [`settings_loader`] - TOML, `.env` and environment variable loading
//! - [`logging`] - Tracing-based logging setup

// These clippy lints are intentionally allowed:
// - doc_markdown: product names (SQLite, PostgreSQL) appear unquoted in docs
// - result_large_err: ShiftError::Statement carries the failing SQL text
#![allow(clippy::doc_markdown)]
#![allow(clippy::result_large_err)]

pub mod driver;
pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use driver::Driver;
pub use error::{Direction, ShiftError, ShiftResult};
pub use settings::Settings;
