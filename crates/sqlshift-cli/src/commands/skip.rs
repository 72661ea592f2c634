//! The `skip` management command.
//!
//! Marks named changesets as `skip` so that `up` never runs them. Changesets
//! that are already applied are refused.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};

use crate::command::ManagementCommand;
use crate::context::MigrationContext;

/// Marks changesets as skipped.
pub struct SkipCommand;

#[async_trait]
impl ManagementCommand for SkipCommand {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn help(&self) -> &'static str {
        "Mark changeset file(s) so that up passes them over"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("files")
                .help("Changeset file name(s)")
                .num_args(1..)
                .required(true),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let files: Vec<String> = matches
            .get_many::<String>("files")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let ctx = MigrationContext::connect(settings).await?;
        let result = match ctx.named_changesets(&files) {
            Ok(changesets) => ctx.runner().skip(&changesets).await,
            Err(e) => Err(e),
        };
        ctx.close().await?;
        let report = result?;

        for version in &report.applied {
            println!("Skipped {version}");
        }
        for version in &report.rejected {
            println!("Refused {version}: already applied, roll it back first");
        }
        Ok(())
    }
}
