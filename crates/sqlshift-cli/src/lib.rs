//! # sqlshift-cli
//!
//! Management commands for sqlshift.
//!
//! This crate provides:
//!
//! - **Command framework** - [`ManagementCommand`] and [`CommandRegistry`],
//!   which builds the `clap` command line and dispatches to handlers
//! - **Built-in commands** - `init`, `create`, `up`, `down`, `status`,
//!   `skip`, `show` and `exec`
//! - **Context** - [`MigrationContext`], the connection, dialect and
//!   changeset directories a command works with
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlshift_cli::command::CommandRegistry;
//! use sqlshift_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"up"));
//! assert!(names.contains(&"down"));
//! assert!(names.contains(&"status"));
//! ```

// These clippy lints are intentionally allowed:
// - result_large_err: ShiftError is the workspace-wide error type
// - doc_markdown: backtick requirements for documentation items are too strict
// - missing_const_for_fn: command handlers share one shape
// - module_name_repetitions: re-exports make module-prefixed names redundant
// - unused_async: command handlers maintain consistent async signatures
// - print_stdout: commands report their results on stdout
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unused_async)]
#![allow(clippy::print_stdout)]

pub mod command;
pub mod commands;
pub mod context;
pub mod table;

// Re-export primary types at the crate root for convenience.
pub use command::{CommandRegistry, ManagementCommand};
pub use context::MigrationContext;
