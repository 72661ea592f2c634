//! The `status` management command.
//!
//! Lists every changeset on disk with its recorded status.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};
use sqlshift_migrations::{Status, StatusRecord};

use crate::command::ManagementCommand;
use crate::context::MigrationContext;
use crate::table::render_table;

/// Shows the status of every changeset.
pub struct StatusCommand;

/// Renders status records as a table with a summary line.
pub fn render_status(records: &[StatusRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.version.clone(),
                r.status.to_string(),
                r.applied_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    let pending = records
        .iter()
        .filter(|r| matches!(r.status, Status::Pending | Status::Down))
        .count();
    let mut out = render_table(&["Version", "Status", "Applied at"], &rows);
    out.push_str(&format!("\n{} changeset(s), {pending} to apply\n", records.len()));
    out
}

#[async_trait]
impl ManagementCommand for StatusCommand {
    fn name(&self) -> &'static str {
        "status"
    }

    fn help(&self) -> &'static str {
        "Show the status of every changeset"
    }

    async fn handle(&self, _matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let ctx = MigrationContext::connect(settings).await?;
        let changesets = ctx.changesets()?;
        let result = ctx.runner().status(&changesets).await;
        ctx.close().await?;

        print!("{}", render_status(&result?));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_status() {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 11, 5)
            .unwrap()
            .and_hms_micro_opt(10, 24, 30, 120)
            .unwrap();
        let records = vec![
            StatusRecord {
                version: "20251105-102430-a.sql".into(),
                status: Status::Up,
                applied_at: Some(at),
            },
            StatusRecord::pending("20251106-000000-b.sql"),
        ];

        let out = render_status(&records);
        assert!(out.contains("20251105-102430-a.sql  up"));
        assert!(out.contains("2025-11-05 10:24:30"));
        assert!(out.contains("20251106-000000-b.sql  pending"));
        assert!(out.ends_with("2 changeset(s), 1 to apply\n"));
    }
}
