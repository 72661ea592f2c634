//! The `down` management command.
//!
//! Rolls back the most recently applied changesets, newest first.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};

use crate::command::ManagementCommand;
use crate::context::MigrationContext;

/// Rolls back applied changesets.
pub struct DownCommand;

#[async_trait]
impl ManagementCommand for DownCommand {
    fn name(&self) -> &'static str {
        "down"
    }

    fn help(&self) -> &'static str {
        "Roll back the most recently applied changesets"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("number")
                .short('n')
                .long("number")
                .value_parser(clap::value_parser!(usize))
                .default_value("1")
                .help("How many changesets to roll back"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let count = matches.get_one::<usize>("number").copied().unwrap_or(1);

        let ctx = MigrationContext::connect(settings).await?;
        let changesets = ctx.changesets()?;
        let result = ctx.runner().down(&changesets, count).await;
        ctx.close().await?;
        let report = result?;

        for version in &report.applied {
            println!("Rolled back {version}");
        }
        for version in &report.passed_over {
            println!("Passed over {version} (no DOWN section)");
        }
        println!("{} changeset(s) rolled back", report.applied.len());
        Ok(())
    }
}
