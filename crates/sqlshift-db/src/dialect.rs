//! SQL dialects for the bookkeeping table.
//!
//! Every statement sqlshift issues against its own table comes from a
//! [`SqlProvider`]. The built-in providers are [`Dialect`] values: a shared
//! set of default statements, a per-driver table of overrides, and a bind
//! style that turns `?` placeholders into `$1, $2, ...` where the driver
//! wants numbered parameters.
//!
//! Providers are looked up through a [`DialectRegistry`], which folds driver
//! aliases (`pg`, `mariadb`, `sqlite3`, ...) before the lookup.
//!
//! Positional parameters expected by each statement:
//!
//! | statement | parameters |
//! |---|---|
//! | `query_one`, `query_status`, `query_exists` | version |
//! | `insert_record` | version, status, applied_at |
//! | `update_record` | status, applied_at, version |
//! | `applied_sorted_by_date` | status, limit |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use sqlshift_core::{Driver, ShiftError, ShiftResult};

static TABLE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("valid regex")
});

/// The statements a provider must be able to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    /// Create the bookkeeping table if it does not exist.
    CreateSchema,
    /// Drop the bookkeeping table if it exists.
    DropSchema,
    /// List the tables of the current database.
    ShowTables,
    /// Describe the columns of one table.
    QueryTableSchema,
    /// Every bookkeeping row.
    QueryAll,
    /// One bookkeeping row by version.
    QueryOne,
    /// The status of one version.
    QueryStatus,
    /// Whether a row exists for a version.
    QueryExists,
    /// Insert a new row.
    InsertRecord,
    /// Update the status and timestamp of an existing row.
    UpdateRecord,
    /// Rows with a given status, most recently applied first.
    AppliedSortedByDate,
}

/// Renders one statement. Receives the bookkeeping table name and the
/// statement argument (only [`Statement::QueryTableSchema`] has one).
pub type Template = fn(&str, &str) -> String;

/// How positional parameters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStyle {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Numbered,
}

/// Source of the SQL text used for the bookkeeping table.
pub trait SqlProvider: Send + Sync {
    /// The driver this provider generates SQL for.
    fn driver(&self) -> Driver;

    /// The bookkeeping table name.
    fn table(&self) -> &str;

    /// Renders a statement. `arg` is only used by [`Statement::QueryTableSchema`].
    fn render(&self, statement: Statement, arg: &str) -> String;

    fn create_schema(&self) -> String {
        self.render(Statement::CreateSchema, "")
    }

    fn drop_schema(&self) -> String {
        self.render(Statement::DropSchema, "")
    }

    fn show_tables(&self) -> String {
        self.render(Statement::ShowTables, "")
    }

    fn query_table_schema(&self, table: &str) -> String {
        self.render(Statement::QueryTableSchema, table)
    }

    fn query_all(&self) -> String {
        self.render(Statement::QueryAll, "")
    }

    fn query_one(&self) -> String {
        self.render(Statement::QueryOne, "")
    }

    fn query_status(&self) -> String {
        self.render(Statement::QueryStatus, "")
    }

    fn query_exists(&self) -> String {
        self.render(Statement::QueryExists, "")
    }

    fn insert_record(&self) -> String {
        self.render(Statement::InsertRecord, "")
    }

    fn update_record(&self) -> String {
        self.render(Statement::UpdateRecord, "")
    }

    fn applied_sorted_by_date(&self) -> String {
        self.render(Statement::AppliedSortedByDate, "")
    }
}

/// Default statements, written for MySQL with `?` placeholders.
pub fn default_statement(statement: Statement, table: &str, arg: &str) -> String {
    match statement {
        Statement::CreateSchema => format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
             version VARCHAR(160) NOT NULL PRIMARY KEY,\n    \
             applied_at TIMESTAMP(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6),\n    \
             status VARCHAR(24) NOT NULL DEFAULT 'up'\n)"
        ),
        Statement::DropSchema => format!("DROP TABLE IF EXISTS {table}"),
        Statement::ShowTables => "SHOW TABLES".to_string(),
        Statement::QueryTableSchema => format!("DESCRIBE `{}`", arg.replace('`', "``")),
        Statement::QueryAll => {
            format!("SELECT version, status, applied_at FROM {table} ORDER BY version")
        }
        Statement::QueryOne => {
            format!("SELECT version, status, applied_at FROM {table} WHERE version = ?")
        }
        Statement::QueryStatus => format!("SELECT status FROM {table} WHERE version = ?"),
        Statement::QueryExists => {
            format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE version = ?)")
        }
        Statement::InsertRecord => {
            format!("INSERT INTO {table} (version, status, applied_at) VALUES (?, ?, ?)")
        }
        Statement::UpdateRecord => {
            format!("UPDATE {table} SET status = ?, applied_at = ? WHERE version = ?")
        }
        Statement::AppliedSortedByDate => format!(
            "SELECT version, status, applied_at FROM {table} WHERE status = ? \
             ORDER BY applied_at DESC, version DESC LIMIT ?"
        ),
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

static MYSQL_OVERRIDES: &[(Statement, Template)] = &[];

static SQLITE_OVERRIDES: &[(Statement, Template)] = &[
    (Statement::CreateSchema, |table: &str, _: &str| {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
             version VARCHAR(160) NOT NULL PRIMARY KEY,\n    \
             applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,\n    \
             status VARCHAR(24) NOT NULL DEFAULT 'up'\n)"
        )
    }),
    (Statement::ShowTables, |_: &str, _: &str| {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            .to_string()
    }),
    (Statement::QueryTableSchema, |_: &str, arg: &str| {
        format!("PRAGMA table_info({})", quote_literal(arg))
    }),
];

static POSTGRES_OVERRIDES: &[(Statement, Template)] = &[
    (Statement::ShowTables, |_: &str, _: &str| {
        "SELECT tablename FROM pg_tables WHERE schemaname = current_schema() ORDER BY tablename"
            .to_string()
    }),
    (Statement::QueryTableSchema, |_: &str, arg: &str| {
        format!(
            "SELECT column_name::text, data_type::text, is_nullable::text, column_default::text \
             FROM information_schema.columns WHERE table_name = {} ORDER BY ordinal_position",
            quote_literal(arg)
        )
    }),
];

static MSSQL_OVERRIDES: &[(Statement, Template)] = &[
    (Statement::CreateSchema, |table: &str, _: &str| {
        format!(
            "IF OBJECT_ID(N'{table}', N'U') IS NULL\nCREATE TABLE {table} (\n    \
             version NVARCHAR(160) NOT NULL PRIMARY KEY,\n    \
             applied_at DATETIME2 NOT NULL DEFAULT SYSUTCDATETIME(),\n    \
             status NVARCHAR(24) NOT NULL DEFAULT 'up'\n)"
        )
    }),
    (Statement::ShowTables, |_: &str, _: &str| {
        "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE' ORDER BY TABLE_NAME"
            .to_string()
    }),
    (Statement::QueryTableSchema, |_: &str, arg: &str| {
        format!(
            "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT \
             FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = {} ORDER BY ORDINAL_POSITION",
            quote_literal(arg)
        )
    }),
    (Statement::QueryExists, |table: &str, _: &str| {
        format!("SELECT CASE WHEN EXISTS(SELECT 1 FROM {table} WHERE version = ?) THEN 1 ELSE 0 END")
    }),
    (Statement::AppliedSortedByDate, |table: &str, _: &str| {
        format!(
            "SELECT version, status, applied_at FROM {table} WHERE status = ? \
             ORDER BY applied_at DESC, version DESC OFFSET 0 ROWS FETCH NEXT ? ROWS ONLY"
        )
    }),
];

/// A provider built from the default statements plus per-driver overrides.
#[derive(Clone)]
pub struct Dialect {
    driver: Driver,
    table: String,
    bind_style: BindStyle,
    overrides: &'static [(Statement, Template)],
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("driver", &self.driver)
            .field("table", &self.table)
            .field("bind_style", &self.bind_style)
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

impl Dialect {
    /// Creates the built-in dialect for `driver` writing to `table`.
    ///
    /// ```
    /// use sqlshift_core::Driver;
    /// use sqlshift_db::dialect::{Dialect, SqlProvider};
    ///
    /// let pg = Dialect::new(Driver::Postgres, "schema_migrations").unwrap();
    /// assert_eq!(
    ///     pg.query_status(),
    ///     "SELECT status FROM schema_migrations WHERE version = $1"
    /// );
    /// ```
    pub fn new(driver: Driver, table: &str) -> ShiftResult<Self> {
        let (bind_style, overrides) = match driver {
            Driver::MySql => (BindStyle::Question, MYSQL_OVERRIDES),
            Driver::Postgres => (BindStyle::Numbered, POSTGRES_OVERRIDES),
            Driver::Sqlite => (BindStyle::Question, SQLITE_OVERRIDES),
            Driver::MsSql => (BindStyle::Question, MSSQL_OVERRIDES),
        };
        Self::with_overrides(driver, table, bind_style, overrides)
    }

    /// Creates a dialect with a custom override table.
    pub fn with_overrides(
        driver: Driver,
        table: &str,
        bind_style: BindStyle,
        overrides: &'static [(Statement, Template)],
    ) -> ShiftResult<Self> {
        validate_table_name(table)?;
        Ok(Self {
            driver,
            table: table.to_string(),
            bind_style,
            overrides,
        })
    }

    /// The placeholder style of this dialect.
    pub const fn bind_style(&self) -> BindStyle {
        self.bind_style
    }
}

impl SqlProvider for Dialect {
    fn driver(&self) -> Driver {
        self.driver
    }

    fn table(&self) -> &str {
        &self.table
    }

    fn render(&self, statement: Statement, arg: &str) -> String {
        let sql = self
            .overrides
            .iter()
            .find(|(s, _)| *s == statement)
            .map_or_else(
                || default_statement(statement, &self.table, arg),
                |(_, template)| template(&self.table, arg),
            );
        match self.bind_style {
            BindStyle::Question => sql,
            BindStyle::Numbered => number_placeholders(&sql),
        }
    }
}

/// Rewrites `?` placeholders as `$1, $2, ...`, leaving quoted literals alone.
pub fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    let mut in_literal = false;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                n += 1;
                out.push('$');
                out.push_str(&n.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

/// Checks that a bookkeeping table name is a plain (optionally schema-qualified) identifier.
pub fn validate_table_name(table: &str) -> ShiftResult<()> {
    if TABLE_NAME.is_match(table) {
        Ok(())
    } else {
        Err(ShiftError::InvalidArgument(format!(
            "'{table}' is not a valid table name"
        )))
    }
}

/// Maps drivers to the providers that generate their SQL.
#[derive(Clone, Default)]
pub struct DialectRegistry {
    providers: HashMap<Driver, Arc<dyn SqlProvider>>,
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut drivers: Vec<_> = self.providers.keys().collect();
        drivers.sort();
        f.debug_struct("DialectRegistry").field("drivers", &drivers).finish()
    }
}

impl DialectRegistry {
    /// Creates a registry with the built-in dialects for all four drivers.
    pub fn new(table: &str) -> ShiftResult<Self> {
        let mut registry = Self::empty();
        for driver in Driver::ALL {
            registry.register(Arc::new(Dialect::new(driver, table)?));
        }
        Ok(registry)
    }

    /// Creates a registry with no providers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers a provider under its driver, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn SqlProvider>) {
        self.providers.insert(provider.driver(), provider);
    }

    /// Looks up a provider by driver name or alias.
    pub fn get(&self, name: &str) -> ShiftResult<Arc<dyn SqlProvider>> {
        let driver = Driver::resolve(name)?;
        self.providers
            .get(&driver)
            .cloned()
            .ok_or_else(|| ShiftError::UnsupportedDialect(name.to_string()))
    }

    /// Looks up a provider by canonical driver.
    pub fn for_driver(&self, driver: Driver) -> ShiftResult<Arc<dyn SqlProvider>> {
        self.get(driver.as_str())
    }

    /// Returns the registered drivers, sorted.
    pub fn drivers(&self) -> Vec<Driver> {
        let mut drivers: Vec<Driver> = self.providers.keys().copied().collect();
        drivers.sort();
        drivers
    }
}
