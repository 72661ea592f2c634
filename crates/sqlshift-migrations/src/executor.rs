//! Runs one changeset section against the database.
//!
//! Each run is a single transaction: the section's SQL and the status row
//! written by [`StatusTracker::save_record_in`] commit together or not at
//! all. On MySQL, DDL commits implicitly, so a failing section can leave
//! earlier DDL from the same section applied.

use tracing::Instrument;

use sqlshift_core::logging::changeset_span;
use sqlshift_core::{Direction, ShiftError, ShiftResult};

use crate::changeset::Changeset;
use crate::status::Status;
use crate::tracker::StatusTracker;

/// What `execute_down` did with a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownOutcome {
    /// The DOWN section ran and the status is now `down`.
    RolledBack,
    /// The changeset has no DOWN section; nothing ran.
    Irreversible,
}

/// Applies and reverts changesets, one transaction each.
#[derive(Debug, Clone)]
pub struct Executor {
    tracker: StatusTracker,
}

impl Executor {
    /// Creates an executor that records statuses through `tracker`.
    pub const fn new(tracker: StatusTracker) -> Self {
        Self { tracker }
    }

    /// Returns the status tracker.
    pub const fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Runs the UP section and records the changeset as `up`.
    pub async fn execute_up(&self, changeset: &Changeset) -> ShiftResult<()> {
        self.run(changeset, Direction::Up, Status::Up)
            .instrument(changeset_span(&changeset.version, Direction::Up))
            .await
    }

    /// Runs the DOWN section and records the changeset as `down`.
    ///
    /// A changeset without a DOWN section is left untouched and reported as
    /// [`DownOutcome::Irreversible`].
    pub async fn execute_down(&self, changeset: &Changeset) -> ShiftResult<DownOutcome> {
        let span = changeset_span(&changeset.version, Direction::Down);
        if !changeset.is_reversible() {
            span.in_scope(|| {
                tracing::warn!(
                    "Changeset {} has no DOWN section, nothing to roll back",
                    changeset.version
                );
            });
            return Ok(DownOutcome::Irreversible);
        }
        self.run(changeset, Direction::Down, Status::Down)
            .instrument(span)
            .await?;
        Ok(DownOutcome::RolledBack)
    }

    async fn run(&self, changeset: &Changeset, direction: Direction, status: Status) -> ShiftResult<()> {
        let version = changeset.version.as_str();
        let sql = changeset.section(direction);
        tracing::info!("Migrating {direction}: {version}");
        tracing::debug!("{sql}");

        let mut tx = self.tracker.backend().begin().await.map_err(|e| {
            ShiftError::Connection(format!("cannot start transaction for {version}: {e}"))
        })?;

        if let Err(e) = tx.execute_batch(sql).await {
            tx.rollback().await.ok();
            return Err(statement_error(version, direction, sql, e));
        }

        if let Err(e) = self.tracker.save_record_in(tx.as_mut(), version, status).await {
            tx.rollback().await.ok();
            return Err(e);
        }

        // Deferred constraints fail here; the backend rolls back on failure.
        tx.commit()
            .await
            .map_err(|e| statement_error(version, direction, sql, e))?;
        tracing::info!("Migrated {direction}: {version}");
        Ok(())
    }
}

fn statement_error(version: &str, direction: Direction, sql: &str, err: ShiftError) -> ShiftError {
    ShiftError::Statement {
        version: version.to_string(),
        direction,
        sql: sql.to_string(),
        message: match err {
            ShiftError::Database(message) => message,
            other => other.to_string(),
        },
    }
}
