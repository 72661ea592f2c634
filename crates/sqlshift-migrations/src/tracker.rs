//! The bookkeeping table that records each changeset's status.
//!
//! [`StatusTracker`] pairs a backend with the [`SqlProvider`] of its dialect
//! and owns every read and write of the bookkeeping table. All failures are
//! reported as [`ShiftError::Persistence`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, SubsecRound};
use sqlshift_core::{ShiftError, ShiftResult};
use sqlshift_db::dialect::validate_table_name;
use sqlshift_db::{Row, SqlProvider, Value};
use sqlshift_db_backends::{DatabaseBackend, Transaction};

use crate::changeset::Changeset;
use crate::status::{Status, StatusRecord};

/// Reads and writes changeset statuses.
#[derive(Clone)]
pub struct StatusTracker {
    backend: Arc<dyn DatabaseBackend>,
    provider: Arc<dyn SqlProvider>,
}

impl std::fmt::Debug for StatusTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusTracker")
            .field("driver", &self.provider.driver())
            .field("table", &self.provider.table())
            .finish()
    }
}

/// The timestamp written with each status change, at microsecond precision.
fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc().trunc_subsecs(6)
}

fn record_from_row(row: &Row) -> ShiftResult<StatusRecord> {
    let version: String = row.get("version")?;
    let status: String = row.get("status")?;
    let applied_at: Option<NaiveDateTime> = row.get("applied_at")?;
    Ok(StatusRecord {
        status: status.parse()?,
        version,
        applied_at,
    })
}

impl StatusTracker {
    /// Creates a tracker over `backend`, generating SQL with `provider`.
    pub fn new(backend: Arc<dyn DatabaseBackend>, provider: Arc<dyn SqlProvider>) -> Self {
        Self { backend, provider }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &Arc<dyn DatabaseBackend> {
        &self.backend
    }

    /// Returns the SQL provider.
    pub fn provider(&self) -> &Arc<dyn SqlProvider> {
        &self.provider
    }

    // ── Schema ───────────────────────────────────────────────────────

    /// Creates the bookkeeping table if it does not exist.
    pub async fn create_schema(&self) -> ShiftResult<()> {
        tracing::debug!("Creating bookkeeping table {}", self.provider.table());
        self.backend
            .execute_batch(&self.provider.create_schema())
            .await
            .map_err(|e| ShiftError::persistence(None, e))
    }

    /// Drops the bookkeeping table if it exists.
    pub async fn drop_schema(&self) -> ShiftResult<()> {
        tracing::debug!("Dropping bookkeeping table {}", self.provider.table());
        self.backend
            .execute_batch(&self.provider.drop_schema())
            .await
            .map_err(|e| ShiftError::persistence(None, e))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Records `status` for `version` in a transaction of its own.
    pub async fn save_record(&self, version: &str, status: Status) -> ShiftResult<()> {
        let mut tx = self
            .backend
            .begin()
            .await
            .map_err(|e| ShiftError::persistence(Some(version), e))?;
        if let Err(e) = self.save_record_in(tx.as_mut(), version, status).await {
            tx.rollback().await.ok();
            return Err(e);
        }
        tx.commit()
            .await
            .map_err(|e| ShiftError::persistence(Some(version), e))
    }

    /// Records `status` for `version` inside the caller's transaction.
    ///
    /// Inserts the row when it is missing and otherwise updates its status
    /// and timestamp, so repeated calls leave exactly one row.
    pub async fn save_record_in(
        &self,
        tx: &mut dyn Transaction,
        version: &str,
        status: Status,
    ) -> ShiftResult<()> {
        let fail = |e: ShiftError| ShiftError::persistence(Some(version), e);

        let rows = tx
            .query(&self.provider.query_exists(), &[Value::from(version)])
            .await
            .map_err(fail)?;
        let exists = match rows.first() {
            Some(row) => row.get_by_index::<bool>(0).map_err(fail)?,
            None => false,
        };

        let applied_at = Value::DateTime(now());
        if exists {
            tx.execute(
                &self.provider.update_record(),
                &[Value::from(status.as_str()), applied_at, Value::from(version)],
            )
            .await
            .map_err(fail)?;
        } else {
            tx.execute(
                &self.provider.insert_record(),
                &[Value::from(version), Value::from(status.as_str()), applied_at],
            )
            .await
            .map_err(fail)?;
        }
        tracing::debug!("Recorded {version} as {status}");
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Returns the status of each changeset, in the order given.
    ///
    /// Changesets without a row are reported as [`Status::Pending`].
    pub async fn get_status(&self, changesets: &[Changeset]) -> ShiftResult<Vec<StatusRecord>> {
        let rows = self
            .backend
            .query(&self.provider.query_all(), &[])
            .await
            .map_err(|e| ShiftError::persistence(None, e))?;

        let known: HashMap<String, StatusRecord> = rows
            .iter()
            .map(|row| record_from_row(row).map(|r| (r.version.clone(), r)))
            .collect::<ShiftResult<_>>()
            .map_err(|e| ShiftError::persistence(None, e))?;

        Ok(changesets
            .iter()
            .map(|c| {
                known
                    .get(&c.version)
                    .cloned()
                    .unwrap_or_else(|| StatusRecord::pending(c.version.clone()))
            })
            .collect())
    }

    /// Returns up to `limit` applied changesets, most recently applied first.
    pub async fn get_applied_sorted_by_date(&self, limit: usize) -> ShiftResult<Vec<StatusRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self
            .backend
            .query(
                &self.provider.applied_sorted_by_date(),
                &[Value::from(Status::Up.as_str()), Value::Int(limit)],
            )
            .await
            .map_err(|e| ShiftError::persistence(None, e))?;
        rows.iter()
            .map(record_from_row)
            .collect::<ShiftResult<_>>()
            .map_err(|e| ShiftError::persistence(None, e))
    }

    /// Returns the stored record of `version`, if any.
    pub async fn find_record(&self, version: &str) -> ShiftResult<Option<StatusRecord>> {
        let rows = self
            .backend
            .query(&self.provider.query_one(), &[Value::from(version)])
            .await
            .map_err(|e| ShiftError::persistence(Some(version), e))?;
        rows.first()
            .map(record_from_row)
            .transpose()
            .map_err(|e| ShiftError::persistence(Some(version), e))
    }

    /// Returns the status of `version`, `Pending` when it has no row.
    pub async fn find_status(&self, version: &str) -> ShiftResult<Status> {
        let fail = |e: ShiftError| ShiftError::persistence(Some(version), e);
        let rows = self
            .backend
            .query(&self.provider.query_status(), &[Value::from(version)])
            .await
            .map_err(fail)?;
        match rows.first() {
            Some(row) => row.get::<String>("status").map_err(fail)?.parse(),
            None => Ok(Status::Pending),
        }
    }

    /// Lists the tables of the database, without the bookkeeping table.
    pub async fn show_tables(&self) -> ShiftResult<Vec<String>> {
        let rows = self
            .backend
            .query(&self.provider.show_tables(), &[])
            .await
            .map_err(|e| ShiftError::persistence(None, e))?;
        let own = self.provider.table();
        let own = own.rsplit('.').next().unwrap_or(own);

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .get_by_index(0)
                .map_err(|e| ShiftError::persistence(None, e))?;
            if !name.eq_ignore_ascii_case(own) {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    /// Describes the columns of `table`, one row per column.
    pub async fn table_schema(&self, table: &str) -> ShiftResult<Vec<Row>> {
        validate_table_name(table)?;
        self.backend
            .query(&self.provider.query_table_schema(table), &[])
            .await
            .map_err(|e| ShiftError::persistence(None, e))
    }
}
