//! Scaffolds new changeset files.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlshift_core::{ShiftError, ShiftResult};

use crate::changeset::{DOWN_MARKER, TIMESTAMP_FORMAT, UP_MARKER};

static CHANGESET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").expect("valid regex"));

/// Checks that `name` can be used as the descriptive part of a file name.
pub fn validate_name(name: &str) -> ShiftResult<()> {
    if CHANGESET_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ShiftError::InvalidArgument(format!(
            "invalid changeset name '{name}': use letters, digits, '_' and '-', not starting with '-'"
        )))
    }
}

/// Creates one changeset file in `dir`, stamped with the current local time.
///
/// The directory is created when missing. Returns the path of the new file.
pub fn create_changeset(dir: impl AsRef<Path>, name: &str) -> ShiftResult<PathBuf> {
    create_changeset_at(dir, name, chrono::Local::now().naive_local())
}

/// Creates one changeset file per name, all stamped with the same time.
///
/// Every name is validated before any file is written.
pub fn create_changesets<S: AsRef<str>>(
    dir: impl AsRef<Path>,
    names: &[S],
) -> ShiftResult<Vec<PathBuf>> {
    for name in names {
        validate_name(name.as_ref())?;
    }
    let now = chrono::Local::now().naive_local();
    names
        .iter()
        .map(|name| create_changeset_at(dir.as_ref(), name.as_ref(), now))
        .collect()
}

/// Creates a changeset file stamped with `now`.
pub fn create_changeset_at(
    dir: impl AsRef<Path>,
    name: &str,
    now: NaiveDateTime,
) -> ShiftResult<PathBuf> {
    validate_name(name)?;
    let dir = dir.as_ref();
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    let path = dir.join(format!("{stamp}-{name}.sql"));
    if path.exists() {
        return Err(ShiftError::DuplicateFile(path));
    }

    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, template(name, author().as_deref(), &stamp))?;
    tracing::info!("Created changeset {}", path.display());
    Ok(path)
}

fn author() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|v| !v.trim().is_empty())
}

fn template(name: &str, author: Option<&str>, stamp: &str) -> String {
    let mut out = format!("--\n-- name: {name}\n");
    if let Some(author) = author {
        out.push_str(&format!("-- author: {author}\n"));
    }
    out.push_str(&format!(
        "-- created at: {stamp}\n\n\
         {UP_MARKER}\n\
         -- Add your migration SQL here\n\
         SELECT 1;\n\n\
         {DOWN_MARKER}\n\
         -- Add your rollback SQL here (optional)\n"
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::Changeset;

    fn at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_hms_opt(10, 24, 30)
            .unwrap()
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("add-age-index").is_ok());
        assert!(validate_name("add_users2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("-flag").is_err());
        assert!(validate_name("has space").is_err());
        assert!(validate_name("dot.name").is_err());
    }

    #[test]
    fn test_created_file_reparses() {
        let dir = tempfile::tempdir().unwrap();
        let path = create_changeset_at(dir.path(), "add-age-index", at()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "20251105-102430-add-age-index.sql"
        );

        let cs = Changeset::parse(&path).unwrap();
        assert_eq!(cs.name, "add-age-index");
        assert_eq!(cs.up_section, "SELECT 1;");
        assert_eq!(cs.down_section, "");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("db").join("migrations");
        let path = create_changeset_at(&nested, "init", at()).unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.is_file());
    }

    #[test]
    fn test_existing_file_is_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        create_changeset_at(dir.path(), "init", at()).unwrap();
        let err = create_changeset_at(dir.path(), "init", at()).unwrap_err();
        assert!(matches!(err, ShiftError::DuplicateFile(_)));
    }

    #[test]
    fn test_create_changesets_validates_all_first() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_changesets(dir.path(), &["good", "-bad"]).unwrap_err();
        assert!(matches!(err, ShiftError::InvalidArgument(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let paths = create_changesets(dir.path(), &["one", "two"]).unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_template_header() {
        let text = template("init", Some("ada"), "20251105-102430");
        assert!(text.starts_with("--\n-- name: init\n-- author: ada\n"));
        assert!(text.contains("-- created at: 20251105-102430"));
        assert!(!template("init", None, "x").contains("author"));
    }
}
