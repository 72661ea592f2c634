//! The changeset file model and its parser.
//!
//! A changeset is one `.sql` file named `YYYYMMDD-HHMMSS-{name}.sql` holding
//! an UP section and an optional DOWN section:
//!
//! ```text
//! -- Migrate:UP
//! CREATE TABLE users (id INT);
//!
//! -- Migrate:DOWN
//! DROP TABLE users;
//! ```
//!
//! The full file name is the changeset's version and the primary key of its
//! bookkeeping row.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlshift_core::{Direction, ShiftError, ShiftResult};

/// Marker that opens the UP section.
pub const UP_MARKER: &str = "-- Migrate:UP";
/// Marker that opens the DOWN section.
pub const DOWN_MARKER: &str = "-- Migrate:DOWN";
/// Layout of the timestamp prefix of a changeset file name.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

static FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{8}-\d{6})-([A-Za-z0-9_-]+)\.sql$").expect("valid regex")
});

/// The parts encoded in a changeset file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameInfo {
    /// The full file name, used as the version.
    pub version: String,
    /// The descriptive part after the timestamp.
    pub name: String,
    /// The calendar date of the timestamp.
    pub date: NaiveDate,
    /// The full timestamp.
    pub timestamp: NaiveDateTime,
}

/// Splits a changeset file name into its version, name and timestamp.
///
/// # Examples
///
/// ```
/// use sqlshift_migrations::changeset::parse_filename;
///
/// let info = parse_filename("20251105-102430-add-age-index.sql").unwrap();
/// assert_eq!(info.name, "add-age-index");
/// assert_eq!(info.timestamp.to_string(), "2025-11-05 10:24:30");
/// assert!(parse_filename("20251105-add-age-index.sql").is_err());
/// ```
pub fn parse_filename(file_name: &str) -> ShiftResult<FilenameInfo> {
    let caps = FILE_NAME.captures(file_name).ok_or_else(|| {
        ShiftError::Format(format!(
            "invalid changeset file name '{file_name}', expected YYYYMMDD-HHMMSS-name.sql"
        ))
    })?;

    let timestamp = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT)
        .map_err(|e| ShiftError::Format(format!("invalid timestamp in '{file_name}': {e}")))?;

    Ok(FilenameInfo {
        version: file_name.to_string(),
        name: caps[2].to_string(),
        date: timestamp.date(),
        timestamp,
    })
}

/// One parsed changeset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    /// The file name, e.g. `20251105-102430-add-age-index.sql`.
    pub version: String,
    /// The descriptive part of the file name.
    pub name: String,
    /// The date encoded in the file name.
    pub date: NaiveDate,
    /// The timestamp encoded in the file name. Changesets run in this order.
    pub timestamp: NaiveDateTime,
    /// Where the file was read from.
    pub path: PathBuf,
    /// SQL run when migrating up. Never empty.
    pub up_section: String,
    /// SQL run when migrating down. Empty when the changeset is irreversible.
    pub down_section: String,
}

impl Changeset {
    /// Reads and parses the changeset at `path`.
    pub fn parse(path: impl AsRef<Path>) -> ShiftResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ShiftError::Format(format!("invalid changeset path '{}'", path.display()))
            })?;
        let bytes = std::fs::read(path)?;
        let contents = String::from_utf8(bytes).map_err(|_| {
            ShiftError::Format(format!("changeset '{file_name}' is not valid UTF-8"))
        })?;
        Self::from_contents(file_name, path, &contents)
    }

    /// Builds a changeset from a file name and the file's text.
    pub fn from_contents(
        file_name: &str,
        path: impl Into<PathBuf>,
        contents: &str,
    ) -> ShiftResult<Self> {
        let info = parse_filename(file_name)?;
        let (up, down) = split_sections(contents);
        let up_section = up.ok_or_else(|| {
            ShiftError::Format(format!("changeset '{file_name}' has no {UP_MARKER} marker"))
        })?;
        if up_section.is_empty() {
            return Err(ShiftError::Format(format!(
                "changeset '{file_name}' has an empty UP section"
            )));
        }

        Ok(Self {
            version: info.version,
            name: info.name,
            date: info.date,
            timestamp: info.timestamp,
            path: path.into(),
            up_section,
            down_section: down.unwrap_or_default(),
        })
    }

    /// Returns the SQL for the given direction.
    pub fn section(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up_section,
            Direction::Down => &self.down_section,
        }
    }

    /// Returns `true` when the changeset has a DOWN section.
    pub fn is_reversible(&self) -> bool {
        !self.down_section.is_empty()
    }
}

#[derive(Clone, Copy)]
enum Cursor {
    None,
    Up,
    Down,
}

/// A marker ends the line or is followed by whitespace or `--`.
fn is_marker(line: &str, marker: &str) -> bool {
    line.strip_prefix(marker).is_some_and(|rest| {
        rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with("--")
    })
}

/// Splits file text into its UP and DOWN sections. A section is `None` when
/// its marker never appears.
fn split_sections(contents: &str) -> (Option<String>, Option<String>) {
    let mut cursor = Cursor::None;
    let mut up: Option<Vec<&str>> = None;
    let mut down: Option<Vec<&str>> = None;

    for line in contents.lines() {
        let head = line.trim_start();
        if is_marker(head, UP_MARKER) {
            cursor = Cursor::Up;
            up.get_or_insert_with(Vec::new);
            continue;
        }
        if is_marker(head, DOWN_MARKER) {
            cursor = Cursor::Down;
            down.get_or_insert_with(Vec::new);
            continue;
        }
        if head.is_empty() || head == "--" || head.starts_with("-- ") {
            continue;
        }
        match cursor {
            Cursor::None => {}
            Cursor::Up => up.get_or_insert_with(Vec::new).push(line),
            Cursor::Down => down.get_or_insert_with(Vec::new).push(line),
        }
    }

    let join = |lines: Vec<&str>| lines.join("\n").trim().to_string();
    (up.map(join), down.map(join))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "20251105-102430-add-age-index.sql";

    #[test]
    fn test_parse_filename() {
        let info = parse_filename(FILE).unwrap();
        assert_eq!(info.version, FILE);
        assert_eq!(info.name, "add-age-index");
        assert_eq!(
            info.timestamp,
            NaiveDate::from_ymd_opt(2025, 11, 5)
                .unwrap()
                .and_hms_opt(10, 24, 30)
                .unwrap()
        );
        assert_eq!(info.date, NaiveDate::from_ymd_opt(2025, 11, 5).unwrap());
    }

    #[test]
    fn test_parse_filename_rejects_bad_names() {
        for name in [
            "20251105-add-age-index",
            "20251105-add-age-index.sql",
            "20251105-102430-add-age-index",
            "20251105-102430-.sql",
            "20251105-102430-add age.sql",
            "2025110-102430-x.sql",
        ] {
            let err = parse_filename(name).unwrap_err();
            assert!(err.is_format(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_parse_filename_rejects_impossible_date() {
        assert!(parse_filename("20251305-102430-x.sql").unwrap_err().is_format());
        assert!(parse_filename("20251105-256000-x.sql").unwrap_err().is_format());
    }

    #[test]
    fn test_sections_are_split_and_trimmed() {
        let text = "-- header comment\n\
                    SELECT 'ignored before any marker';\n\
                    -- Migrate:UP\n\
                    \n\
                    CREATE TABLE users (\n    id INT\n);\n\
                    -- a note\n\
                    INSERT INTO users VALUES (1);\n\
                    \n\
                    -- Migrate:DOWN\n\
                    DROP TABLE users;\n";
        let cs = Changeset::from_contents(FILE, "m", text).unwrap();
        assert_eq!(
            cs.up_section,
            "CREATE TABLE users (\n    id INT\n);\nINSERT INTO users VALUES (1);"
        );
        assert_eq!(cs.down_section, "DROP TABLE users;");
        assert!(cs.is_reversible());
        assert_eq!(cs.section(Direction::Down), "DROP TABLE users;");
    }

    #[test]
    fn test_markers_with_trailing_dashes() {
        let text = "-- Migrate:UP --\nSELECT 1;\n-- Migrate:DOWN --\nSELECT 2;\n";
        let cs = Changeset::from_contents(FILE, "m", text).unwrap();
        assert_eq!(cs.up_section, "SELECT 1;");
        assert_eq!(cs.down_section, "SELECT 2;");
    }

    #[test]
    fn test_marker_prefix_of_longer_word_is_a_comment() {
        let text = "-- Migrate:UP\nSELECT 1;\n-- Migrate:DOWNGRADE notes\nSELECT 2;\n";
        let cs = Changeset::from_contents(FILE, "m", text).unwrap();
        assert_eq!(cs.up_section, "SELECT 1;\nSELECT 2;");
        assert!(!cs.is_reversible());

        let err = Changeset::from_contents(FILE, "m", "-- Migrate:UPGRADE\nSELECT 1;\n").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_missing_down_section_is_irreversible() {
        let cs = Changeset::from_contents(FILE, "m", "-- Migrate:UP\nSELECT 1;\n").unwrap();
        assert_eq!(cs.down_section, "");
        assert!(!cs.is_reversible());
    }

    #[test]
    fn test_missing_or_empty_up_is_format_error() {
        let err = Changeset::from_contents(FILE, "m", "SELECT 1;\n").unwrap_err();
        assert!(err.is_format());

        let err = Changeset::from_contents(
            FILE,
            "m",
            "-- Migrate:UP\n-- Add your SQL here\n\n-- Migrate:DOWN\nSELECT 1;",
        )
        .unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_parse_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE);
        std::fs::write(&path, "-- Migrate:UP\nCREATE INDEX i ON t (age);\n").unwrap();

        let cs = Changeset::parse(&path).unwrap();
        assert_eq!(cs.version, FILE);
        assert_eq!(cs.path, path);
        assert_eq!(cs.up_section, "CREATE INDEX i ON t (age);");
    }

    #[test]
    fn test_parse_rejects_non_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE);
        std::fs::write(&path, [0x2d, 0x2d, 0x20, 0xff, 0xfe]).unwrap();
        assert!(Changeset::parse(&path).unwrap_err().is_format());
    }
}
