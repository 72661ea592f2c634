//! The `up` management command.
//!
//! Applies pending and rolled-back changesets in timestamp order. Changesets
//! marked `skip` are passed over. The batch stops at the first failure.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};
use sqlshift_migrations::UpOptions;

use crate::command::ManagementCommand;
use crate::context::MigrationContext;

/// Applies pending changesets.
pub struct UpCommand;

#[async_trait]
impl ManagementCommand for UpCommand {
    fn name(&self) -> &'static str {
        "up"
    }

    fn help(&self) -> &'static str {
        "Apply pending changesets"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("number")
                .short('n')
                .long("number")
                .value_parser(clap::value_parser!(usize))
                .help("Apply at most this many changesets"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let options = UpOptions {
            limit: matches.get_one::<usize>("number").copied(),
        };

        let ctx = MigrationContext::connect(settings).await?;
        let changesets = ctx.changesets()?;
        if changesets.is_empty() {
            println!("No changesets found");
            return ctx.close().await;
        }

        let started = std::time::Instant::now();
        let result = ctx.runner().up(&changesets, options).await;
        ctx.close().await?;
        let report = result?;

        for version in &report.applied {
            println!("Applied {version}");
        }
        println!(
            "{} changeset(s) applied in {:.2?}",
            report.applied.len(),
            started.elapsed()
        );
        Ok(())
    }
}
