//! The `exec` management command.
//!
//! Runs ad-hoc SQL against the target database, given inline or as the path
//! of a `.sql` file. Nothing is recorded in the bookkeeping table.

use std::path::Path;

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftError, ShiftResult};

use crate::command::ManagementCommand;
use crate::context::MigrationContext;

const MAX_PATH_LEN: usize = 128;

/// Executes SQL outside of any changeset.
pub struct ExecCommand;

/// Resolves the argument to SQL text, reading it from a file when it names one.
pub fn resolve_sql(sql_or_file: &str) -> ShiftResult<String> {
    let input = sql_or_file.trim();
    if input.is_empty() {
        return Err(ShiftError::InvalidArgument(
            "no SQL statement or file given".to_string(),
        ));
    }
    if input.len() >= MAX_PATH_LEN || !input.ends_with(".sql") {
        return Ok(input.to_string());
    }

    let path = Path::new(input);
    if !path.is_file() {
        return Err(ShiftError::InvalidArgument(format!(
            "SQL file does not exist: {}",
            path.display()
        )));
    }
    let sql = std::fs::read_to_string(path)?.trim().to_string();
    if sql.is_empty() {
        return Err(ShiftError::InvalidArgument(format!(
            "SQL file is empty: {}",
            path.display()
        )));
    }
    Ok(sql)
}

#[async_trait]
impl ManagementCommand for ExecCommand {
    fn name(&self) -> &'static str {
        "exec"
    }

    fn help(&self) -> &'static str {
        "Execute an SQL statement or SQL file directly"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("sql-or-file")
                .help("SQL text, or the path of a .sql file")
                .required(true),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let arg = matches
            .get_one::<String>("sql-or-file")
            .map_or("", String::as_str);
        let sql = resolve_sql(arg)?;
        tracing::debug!("{sql}");

        let ctx = MigrationContext::connect(settings).await?;
        let result = ctx.tracker().backend().execute_batch(&sql).await;
        ctx.close().await?;
        result?;

        tracing::info!("Executed ad-hoc SQL");
        println!("SQL executed successfully");
        Ok(())
    }
}
