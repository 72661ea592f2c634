//! The `create` management command.
//!
//! Scaffolds one changeset file per name in the first configured migrations
//! directory. Does not touch the database.

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftResult};

use crate::command::ManagementCommand;
use crate::context::primary_root;

/// Creates new changeset files.
pub struct CreateCommand;

#[async_trait]
impl ManagementCommand for CreateCommand {
    fn name(&self) -> &'static str {
        "create"
    }

    fn help(&self) -> &'static str {
        "Create new changeset files"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("names")
                .help("Changeset name(s), e.g. add-users-table")
                .num_args(1..)
                .required(true),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let names: Vec<String> = matches
            .get_many::<String>("names")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let dir = primary_root(settings);
        for path in sqlshift_migrations::create_changesets(&dir, &names)? {
            println!("Created {}", path.display());
        }
        Ok(())
    }
}
