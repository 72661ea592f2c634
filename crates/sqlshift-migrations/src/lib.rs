//! # sqlshift-migrations
//!
//! The migration engine: changeset files on disk, their status in the
//! bookkeeping table, and the transactional execution of their sections.
//!
//! ## Architecture
//!
//! - [`Changeset`] is one `YYYYMMDD-HHMMSS-name.sql` file with an UP and an
//!   optional DOWN section.
//! - [`discover`] finds the changesets of a directory in timestamp order.
//! - [`StatusTracker`] reads and writes the bookkeeping table through a
//!   dialect's [`SqlProvider`](sqlshift_db::SqlProvider).
//! - [`Executor`] runs one section and records the new status in the same
//!   transaction.
//! - [`Runner`] drives whole `up`, `down` and `skip` batches.
//!
//! ## Module Overview
//!
//! - [`changeset`] - `Changeset`, file name parsing
//! - [`discovery`] - `discover`, `discover_all`, `changesets_from`
//! - [`creator`] - scaffolding of new changeset files
//! - [`status`] - `Status`, `StatusRecord`
//! - [`tracker`] - `StatusTracker`
//! - [`executor`] - `Executor`, `DownOutcome`
//! - [`runner`] - `Runner`, `UpOptions`, `StepConfirm`, `BatchReport`

// Clippy overrides appropriate for a migration engine crate.
#![allow(clippy::result_large_err)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::format_push_string)]

pub mod changeset;
pub mod creator;
pub mod discovery;
pub mod executor;
pub mod runner;
pub mod status;
pub mod tracker;

// Re-export key types at the crate root.
pub use changeset::{parse_filename, Changeset, FilenameInfo};
pub use creator::{create_changeset, create_changesets};
pub use discovery::{changesets_from, discover, discover_all};
pub use executor::{DownOutcome, Executor};
pub use runner::{AlwaysConfirm, BatchReport, Runner, StepConfirm, UpOptions};
pub use status::{Status, StatusRecord};
pub use tracker::StatusTracker;
