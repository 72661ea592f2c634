//! The `show` management command.
//!
//! Inspects the target database: its tables, or the columns of one table.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};

use crate::command::ManagementCommand;
use crate::context::MigrationContext;
use crate::table::{render_rows, render_table};

/// Shows database tables or a table's columns.
pub struct ShowCommand;

#[async_trait]
impl ManagementCommand for ShowCommand {
    fn name(&self) -> &'static str {
        "show"
    }

    fn help(&self) -> &'static str {
        "Show the database tables or the columns of a table"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("tables")
                .long("tables")
                .action(clap::ArgAction::SetTrue)
                .help("List the tables, without the bookkeeping table"),
        )
        .arg(
            clap::Arg::new("schema")
                .long("schema")
                .value_name("TABLE")
                .help("Describe the columns of TABLE"),
        )
        .group(
            clap::ArgGroup::new("what")
                .args(["tables", "schema"])
                .required(true),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let ctx = MigrationContext::connect(settings).await?;
        let tracker = ctx.tracker();

        let result = match matches.get_one::<String>("schema") {
            Some(table) => tracker
                .table_schema(table)
                .await
                .map(|rows| render_rows(&rows)),
            None => tracker.show_tables().await.map(|tables| {
                let rows: Vec<Vec<String>> = tables.into_iter().map(|t| vec![t]).collect();
                render_table(&["Table"], &rows)
            }),
        };
        ctx.close().await?;

        print!("{}", result?);
        Ok(())
    }
}
