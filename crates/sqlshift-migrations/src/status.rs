//! Changeset statuses as stored in the bookkeeping table.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlshift_core::ShiftError;

/// Where a changeset stands against one database.
///
/// `Pending` is never stored; it is what a changeset without a row reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Never applied.
    Pending,
    /// Applied.
    Up,
    /// Applied, then rolled back.
    Down,
    /// Marked as not to be run.
    Skip,
}

impl Status {
    /// Returns the text stored in the `status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Up => "up",
            Self::Down => "down",
            Self::Skip => "skip",
        }
    }

    /// Returns `true` when an `up` batch should pass this changeset over.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Up | Self::Skip)
    }

    /// Returns `true` when the explicit skip operation may mark this changeset.
    pub const fn can_skip(self) -> bool {
        !matches!(self, Self::Up)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "skip" => Ok(Self::Skip),
            other => Err(ShiftError::Database(format!(
                "unknown changeset status '{other}'"
            ))),
        }
    }
}

/// A changeset's version with its current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// The changeset file name.
    pub version: String,
    /// The current status.
    pub status: Status,
    /// When the status last changed. `None` for pending changesets.
    pub applied_at: Option<NaiveDateTime>,
}

impl StatusRecord {
    /// A record for a changeset the database has never seen.
    pub fn pending(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            status: Status::Pending,
            applied_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_text() {
        for status in [Status::Pending, Status::Up, Status::Down, Status::Skip] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert_eq!(" UP ".parse::<Status>().unwrap(), Status::Up);
        assert!("applied".parse::<Status>().is_err());
    }

    #[test]
    fn test_transitions() {
        assert!(Status::Up.is_settled());
        assert!(Status::Skip.is_settled());
        assert!(!Status::Pending.is_settled());
        assert!(!Status::Down.is_settled());

        assert!(!Status::Up.can_skip());
        assert!(Status::Down.can_skip());
        assert!(Status::Pending.can_skip());
    }

    #[test]
    fn test_pending_record() {
        let rec = StatusRecord::pending("v1.sql");
        assert_eq!(rec.status, Status::Pending);
        assert!(rec.applied_at.is_none());
    }
}
