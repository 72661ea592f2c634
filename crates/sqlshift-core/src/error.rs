//! Error types for sqlshift.
//!
//! Every fallible operation in the workspace returns [`ShiftResult`]. The
//! variants of [`ShiftError`] are grouped by the layer that raises them:
//! changeset files, dialects and connections, changeset execution, the
//! bookkeeping table, and configuration.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which section of a changeset is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The `-- Migrate:UP` section.
    Up,
    /// The `-- Migrate:DOWN` section.
    Down,
}

impl Direction {
    /// Returns the lowercase name used in log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type shared by all sqlshift crates.
#[derive(Error, Debug)]
pub enum ShiftError {
    // ── Changeset files ──────────────────────────────────────────────

    /// A file name or file body does not follow the changeset format.
    #[error("Format error: {0}")]
    Format(String),

    /// A changeset file already exists, or the same version was found twice.
    #[error("Duplicate changeset file: {}", .0.display())]
    DuplicateFile(PathBuf),

    /// A version is tracked or requested but has no file on disk.
    #[error("Changeset file not found for version '{0}'")]
    MissingFile(String),

    // ── Dialects and connections ─────────────────────────────────────

    /// No SQL provider is registered for the requested driver.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// The database could not be reached or a connection could not be acquired.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A raw backend failure that has not yet been given context.
    #[error("Database error: {0}")]
    Database(String),

    // ── Execution ────────────────────────────────────────────────────

    /// The SQL of a changeset section failed. The whole section is attached.
    #[error("Changeset '{version}' failed while migrating {direction}: {message}\n--- SQL ---\n{sql}")]
    Statement {
        /// Version (file name) of the failing changeset.
        version: String,
        /// The section that was running.
        direction: Direction,
        /// The SQL text that was sent to the database.
        sql: String,
        /// The driver's error message.
        message: String,
    },

    // ── Bookkeeping ──────────────────────────────────────────────────

    /// Reading or writing the bookkeeping table failed.
    #[error("Status tracking failed{}: {message}", version_suffix(.version.as_deref()))]
    Persistence {
        /// The version being recorded, when there is one.
        version: Option<String>,
        /// The underlying error message.
        message: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A setting is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A caller passed an argument that can never succeed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn version_suffix(version: Option<&str>) -> String {
    version.map_or_else(String::new, |v| format!(" for '{v}'"))
}

impl ShiftError {
    /// Wraps an error raised while touching the bookkeeping table.
    pub fn persistence(version: Option<&str>, err: impl fmt::Display) -> Self {
        Self::Persistence {
            version: version.map(str::to_string),
            message: err.to_string(),
        }
    }

    /// Returns `true` for errors caused by the content of a changeset file.
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

/// A convenience type alias for `Result<T, ShiftError>`.
pub type ShiftResult<T> = Result<T, ShiftError>;
