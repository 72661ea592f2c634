//! Subcommand plumbing for the `sqlshift` binary.
//!
//! Every subcommand implements [`ManagementCommand`]; a [`CommandRegistry`]
//! collects them, turns them into one clap tree and routes parsed arguments
//! back to the matching handler.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use sqlshift_cli::command::{CommandRegistry, ManagementCommand};
//! use sqlshift_core::{Settings, ShiftResult};
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl ManagementCommand for Ping {
//!     fn name(&self) -> &str { "ping" }
//!     fn help(&self) -> &str { "Check the database connection" }
//!
//!     async fn handle(&self, _: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
//!         println!("would connect with {}", settings.database.driver);
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(Box::new(Ping));
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlshift_core::{Settings, ShiftError, ShiftResult};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "./sqlshift.toml";

/// One `sqlshift` subcommand.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &str;

    /// One-line description shown in `--help`.
    fn help(&self) -> &str;

    /// Declares the subcommand's own flags and positionals.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the subcommand. `matches` holds only this subcommand's arguments.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()>;
}

/// Subcommands keyed by name, kept in name order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `command`, replacing any earlier one with the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name().to_string(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Registered names in alphabetical order.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the clap tree: the global `--config/-c` and `--verbose/-v`
    /// options plus one subcommand per registered command.
    pub fn build_cli(&self) -> clap::Command {
        let root = clap::Command::new("sqlshift")
            .about("Versioned, file-based SQL migrations")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                clap::Arg::new("config")
                    .short('c')
                    .long("config")
                    .global(true)
                    .default_value(DEFAULT_CONFIG_FILE)
                    .help("Path to the configuration file"),
            )
            .arg(
                clap::Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .global(true)
                    .action(clap::ArgAction::SetTrue)
                    .help("Log the SQL that is executed"),
            );

        self.commands.iter().fold(root, |root, (name, command)| {
            // clap needs 'static names; the tree is built once per process.
            let name: &'static str = Box::leak(name.clone().into_boxed_str());
            let sub = clap::Command::new(name).about(command.help().to_string());
            root.subcommand(command.add_arguments(sub))
        })
    }

    /// Routes `matches` to the subcommand it names.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> ShiftResult<()> {
        let Some((name, args)) = matches.subcommand() else {
            return Err(ShiftError::InvalidArgument(
                "No subcommand specified".to_string(),
            ));
        };
        let command = self
            .get(name)
            .ok_or_else(|| ShiftError::InvalidArgument(format!("Unknown command: {name}")))?;

        tracing::debug!("Running command '{name}'");
        command.handle(args, settings).await
    }
}
