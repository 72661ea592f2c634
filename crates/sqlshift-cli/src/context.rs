//! Wiring shared by the commands that talk to the database.
//!
//! [`MigrationContext`] turns [`Settings`] into a connected backend, the
//! dialect of its driver and a [`StatusTracker`], and knows where the
//! changeset files live.

use std::path::{Path, PathBuf};

use sqlshift_core::{Driver, Settings, ShiftError, ShiftResult};
use sqlshift_db::DialectRegistry;
use sqlshift_migrations::{changesets_from, discover_all, Changeset, Runner, StatusTracker};

/// A connected database plus the location of its changesets.
#[derive(Debug)]
pub struct MigrationContext {
    driver: Driver,
    roots: Vec<PathBuf>,
    recursive: bool,
    tracker: StatusTracker,
}

impl MigrationContext {
    /// Connects to the database described by `settings`.
    pub async fn connect(settings: &Settings) -> ShiftResult<Self> {
        let driver = Driver::resolve(&settings.database.driver)?;
        let registry = DialectRegistry::new(&settings.migrations.table)?;
        let provider = registry.for_driver(driver)?;
        let backend = sqlshift_db_backends::connect(driver, &settings.database.dsn).await?;
        tracing::debug!("Connected to {driver} database");

        Ok(Self {
            driver,
            roots: settings.migrations.paths(),
            recursive: settings.migrations.recursive,
            tracker: StatusTracker::new(backend, provider),
        })
    }

    /// Returns the canonical driver.
    pub const fn driver(&self) -> Driver {
        self.driver
    }

    /// Returns the status tracker.
    pub const fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    /// Returns a runner that confirms every step.
    pub fn runner(&self) -> Runner {
        Runner::new(self.tracker.clone())
    }

    /// Discovers every changeset under the configured directories.
    pub fn changesets(&self) -> ShiftResult<Vec<Changeset>> {
        discover_all(&self.roots, self.recursive)
    }

    /// Parses the named changeset files, looking in each configured directory.
    ///
    /// Names may be given as paths; only the file name is used.
    pub fn named_changesets(&self, names: &[String]) -> ShiftResult<Vec<Changeset>> {
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            let file_name = Path::new(name)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(name.as_str());
            let root = self
                .roots
                .iter()
                .find(|root| root.join(file_name).is_file())
                .ok_or_else(|| ShiftError::MissingFile(file_name.to_string()))?;
            found.extend(changesets_from(root, &[file_name])?);
        }
        Ok(found)
    }

    /// Releases the connection pool.
    pub async fn close(&self) -> ShiftResult<()> {
        self.tracker.backend().close().await
    }
}

/// The directory new changesets are written to: the first configured one.
pub fn primary_root(settings: &Settings) -> PathBuf {
    settings
        .migrations
        .paths()
        .into_iter()
        .next()
        .unwrap_or_else(|| PathBuf::from(sqlshift_core::settings::DEFAULT_MIGRATIONS_PATH))
}
