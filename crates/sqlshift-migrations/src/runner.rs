//! Batch operations over a list of changesets.
//!
//! A [`Runner`] drives the [`Executor`] through a set of changesets in disk
//! order. Batches run strictly one changeset at a time; each changeset is
//! committed before the next starts, and the first failure ends the batch
//! with earlier changesets left applied.

use std::collections::HashMap;
use std::sync::Arc;

use sqlshift_core::{Direction, ShiftError, ShiftResult};

use crate::changeset::Changeset;
use crate::executor::{DownOutcome, Executor};
use crate::status::{Status, StatusRecord};
use crate::tracker::StatusTracker;

/// Decides whether a single step of a batch should run.
pub trait StepConfirm: Send + Sync {
    /// Returns `true` to run `changeset` in `direction`.
    fn confirm(&self, changeset: &Changeset, direction: Direction) -> bool;
}

/// Confirms every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl StepConfirm for AlwaysConfirm {
    fn confirm(&self, _changeset: &Changeset, _direction: Direction) -> bool {
        true
    }
}

impl<F> StepConfirm for F
where
    F: Fn(&Changeset, Direction) -> bool + Send + Sync,
{
    fn confirm(&self, changeset: &Changeset, direction: Direction) -> bool {
        self(changeset, direction)
    }
}

/// Options for [`Runner::up`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpOptions {
    /// Apply at most this many changesets.
    pub limit: Option<usize>,
}

/// What a batch did, by version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Changesets that ran (or, for `skip`, were marked).
    pub applied: Vec<String>,
    /// Changesets passed over: already settled, declined, or irreversible.
    pub passed_over: Vec<String>,
    /// Changesets the operation refused to touch.
    pub rejected: Vec<String>,
}

impl BatchReport {
    /// Returns `true` when nothing ran.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Runs batches of changesets.
pub struct Runner {
    executor: Executor,
    confirm: Arc<dyn StepConfirm>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Creates a runner that confirms every step.
    pub fn new(tracker: StatusTracker) -> Self {
        Self {
            executor: Executor::new(tracker),
            confirm: Arc::new(AlwaysConfirm),
        }
    }

    /// Replaces the step confirmation hook.
    pub fn with_confirm(mut self, confirm: impl StepConfirm + 'static) -> Self {
        self.confirm = Arc::new(confirm);
        self
    }

    /// Returns the executor.
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Returns the status tracker.
    pub const fn tracker(&self) -> &StatusTracker {
        self.executor.tracker()
    }

    /// Applies every pending or rolled-back changeset, in order.
    ///
    /// Changesets that are `up` or `skip` are passed over. Stops at the
    /// first failure and returns its error.
    pub async fn up(&self, changesets: &[Changeset], options: UpOptions) -> ShiftResult<BatchReport> {
        self.tracker().create_schema().await?;
        let statuses = self.tracker().get_status(changesets).await?;
        let mut report = BatchReport::default();

        for (changeset, record) in changesets.iter().zip(statuses) {
            if record.status.is_settled() {
                tracing::debug!("Passing over {} ({})", changeset.version, record.status);
                report.passed_over.push(changeset.version.clone());
                continue;
            }
            if options.limit.is_some_and(|limit| report.applied.len() >= limit) {
                break;
            }
            if !self.confirm.confirm(changeset, Direction::Up) {
                tracing::info!("Declined {}", changeset.version);
                report.passed_over.push(changeset.version.clone());
                continue;
            }
            self.executor.execute_up(changeset).await?;
            report.applied.push(changeset.version.clone());
        }

        tracing::info!("Applied {} changeset(s)", report.applied.len());
        Ok(report)
    }

    /// Rolls back the `count` most recently applied changesets, newest first.
    ///
    /// `count` is clamped to the number of applied changesets. Every tracked
    /// version must have its file among `changesets`; this is checked before
    /// anything runs. Irreversible changesets are passed over.
    pub async fn down(&self, changesets: &[Changeset], count: usize) -> ShiftResult<BatchReport> {
        if count == 0 {
            return Err(ShiftError::InvalidArgument(
                "the number of changesets to roll back must be at least 1".to_string(),
            ));
        }
        self.tracker().create_schema().await?;

        let by_version: HashMap<&str, &Changeset> = changesets
            .iter()
            .map(|c| (c.version.as_str(), c))
            .collect();
        let applied = self.tracker().get_applied_sorted_by_date(count).await?;
        let targets = applied
            .iter()
            .map(|record| {
                by_version
                    .get(record.version.as_str())
                    .copied()
                    .ok_or_else(|| ShiftError::MissingFile(record.version.clone()))
            })
            .collect::<ShiftResult<Vec<_>>>()?;

        if targets.len() < count {
            tracing::debug!("Only {} changeset(s) are applied", targets.len());
        }

        let mut report = BatchReport::default();
        for changeset in targets {
            if !self.confirm.confirm(changeset, Direction::Down) {
                tracing::info!("Declined {}", changeset.version);
                report.passed_over.push(changeset.version.clone());
                continue;
            }
            match self.executor.execute_down(changeset).await? {
                DownOutcome::RolledBack => report.applied.push(changeset.version.clone()),
                DownOutcome::Irreversible => report.passed_over.push(changeset.version.clone()),
            }
        }

        tracing::info!("Rolled back {} changeset(s)", report.applied.len());
        Ok(report)
    }

    /// Marks changesets as `skip` so that `up` passes them over.
    ///
    /// Changesets that are currently `up` are rejected and left as they are.
    pub async fn skip(&self, changesets: &[Changeset]) -> ShiftResult<BatchReport> {
        self.tracker().create_schema().await?;
        let statuses = self.tracker().get_status(changesets).await?;
        let mut report = BatchReport::default();

        for (changeset, record) in changesets.iter().zip(statuses) {
            if !record.status.can_skip() {
                tracing::warn!(
                    "Cannot skip {}: it is already applied, roll it back first",
                    changeset.version
                );
                report.rejected.push(changeset.version.clone());
                continue;
            }
            self.tracker()
                .save_record(&changeset.version, Status::Skip)
                .await?;
            tracing::info!("Skipped {}", changeset.version);
            report.applied.push(changeset.version.clone());
        }
        Ok(report)
    }

    /// Returns the status of each changeset, in the order given.
    pub async fn status(&self, changesets: &[Changeset]) -> ShiftResult<Vec<StatusRecord>> {
        self.tracker().create_schema().await?;
        self.tracker().get_status(changesets).await
    }
}
