//! Settings for sqlshift.
//!
//! [`Settings`] holds everything the tool needs to find changeset files and
//! reach the target database. It is plain data: build it with
//! [`Settings::default`] or load it through [`settings_loader`](crate::settings_loader)
//! and pass it explicitly to whatever needs it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default name of the bookkeeping table.
pub const DEFAULT_TABLE: &str = "schema_migrations";

/// Default directory for changeset files.
pub const DEFAULT_MIGRATIONS_PATH: &str = "./migrations";

/// Placeholder in the migrations path replaced by the canonical driver name.
pub const DRIVER_PLACEHOLDER: &str = "{driver}";

/// Database connection configuration.
///
/// Either `dsn` is set directly, or it is assembled from the discrete
/// `host`/`port`/`user`/`password`/`dbname` parts when settings are loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Driver identifier (`postgres`, `mysql`, `sqlite`, `mssql` or an alias).
    pub driver: String,
    /// Connection string handed to the driver.
    pub dsn: String,
    /// Database host.
    pub host: String,
    /// Database port. `0` means the driver's default port.
    pub port: u16,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Database name (or file path for SQLite).
    pub dbname: String,
    /// Optional `sslmode` appended to PostgreSQL connection strings.
    pub ssl_mode: String,
}

/// Where changeset files live and how they are tracked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationsSettings {
    /// One or more directories, comma-separated. May contain `{driver}`.
    pub path: String,
    /// Whether discovery descends into subdirectories.
    pub recursive: bool,
    /// Name of the bookkeeping table.
    pub table: String,
}

impl Default for MigrationsSettings {
    fn default() -> Self {
        Self {
            path: DEFAULT_MIGRATIONS_PATH.to_string(),
            recursive: false,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl MigrationsSettings {
    /// Splits the configured path into its directories.
    ///
    /// ```
    /// use sqlshift_core::settings::MigrationsSettings;
    ///
    /// let m = MigrationsSettings { path: "db/a, db/b".into(), ..Default::default() };
    /// assert_eq!(m.paths().len(), 2);
    /// ```
    pub fn paths(&self) -> Vec<PathBuf> {
        self.path
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

/// The complete set of sqlshift settings.
///
/// # Examples
///
/// ```
/// use sqlshift_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.migrations.table, "schema_migrations");
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    // ── Database ─────────────────────────────────────────────────────

    /// Connection settings for the target database.
    pub database: DatabaseSettings,

    // ── Migrations ───────────────────────────────────────────────────

    /// Changeset location and bookkeeping table.
    pub migrations: MigrationsSettings,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "debug", "sqlshift_migrations=trace").
    pub log_level: String,
    /// Output format of the log subscriber.
    pub log_format: LogFormat,
    /// When set, executed SQL is logged at `debug` level and the filter is raised.
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseSettings::default(),
            migrations: MigrationsSettings::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            verbose: false,
        }
    }
}
