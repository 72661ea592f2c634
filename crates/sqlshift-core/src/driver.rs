//! Canonical database driver identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShiftError;

/// A supported database family.
///
/// Driver names coming from configuration are folded onto one of these
/// variants by [`Driver::resolve`], so every alias shares one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite 3.
    Sqlite,
    /// Microsoft SQL Server.
    MsSql,
}

impl Driver {
    /// All drivers, in display order.
    pub const ALL: [Self; 4] = [Self::MySql, Self::Postgres, Self::Sqlite, Self::MsSql];

    /// Resolves a driver name or alias, ignoring case and surrounding whitespace.
    ///
    /// ```
    /// use sqlshift_core::Driver;
    ///
    /// assert_eq!(Driver::resolve("MariaDB").unwrap(), Driver::MySql);
    /// assert_eq!(Driver::resolve("pgsql").unwrap(), Driver::Postgres);
    /// assert!(Driver::resolve("oracle").is_err());
    /// ```
    pub fn resolve(name: &str) -> Result<Self, ShiftError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" | "mysql2" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" | "pgsql" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "mssql" | "sqlserver" => Ok(Self::MsSql),
            _ => Err(ShiftError::UnsupportedDialect(name.to_string())),
        }
    }

    /// The canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::MsSql => "mssql",
        }
    }

    /// The port used when settings leave `port` at `0`. SQLite has none.
    pub const fn default_port(self) -> Option<u16> {
        match self {
            Self::MySql => Some(3306),
            Self::Postgres => Some(5432),
            Self::MsSql => Some(1433),
            Self::Sqlite => None,
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}
