//! The `init` management command.
//!
//! Creates the bookkeeping table. With `--drop` the table is dropped first,
//! which forgets every recorded status.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};

use crate::command::ManagementCommand;
use crate::context::MigrationContext;

/// Creates (or recreates) the bookkeeping table.
pub struct InitCommand;

#[async_trait]
impl ManagementCommand for InitCommand {
    fn name(&self) -> &'static str {
        "init"
    }

    fn help(&self) -> &'static str {
        "Create the bookkeeping table"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("drop")
                .long("drop")
                .action(clap::ArgAction::SetTrue)
                .help("Drop the bookkeeping table first, forgetting all recorded statuses"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let ctx = MigrationContext::connect(settings).await?;
        let tracker = ctx.tracker();

        if matches.get_flag("drop") {
            tracing::warn!("Dropping bookkeeping table {}", settings.migrations.table);
            tracker.drop_schema().await?;
        }
        tracker.create_schema().await?;

        tracing::info!("Bookkeeping table {} is ready", settings.migrations.table);
        println!("Bookkeeping table {} is ready", settings.migrations.table);
        ctx.close().await
    }
}
