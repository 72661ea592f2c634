//! The `sqlshift` command line tool.
//!
//! ```bash
//! sqlshift init
//! sqlshift create add-users-table
//! sqlshift up
//! sqlshift down --number 2
//! sqlshift status -c ./config/sqlshift.toml
//! ```

use std::process::ExitCode;

use sqlshift_cli::command::{CommandRegistry, DEFAULT_CONFIG_FILE};
use sqlshift_cli::commands::register_builtin_commands;
use sqlshift_core::logging::setup_logging;
use sqlshift_core::settings_loader;
use sqlshift_core::{Settings, ShiftResult};

fn load_settings(matches: &clap::ArgMatches) -> ShiftResult<Settings> {
    let config = matches
        .get_one::<String>("config")
        .map_or(DEFAULT_CONFIG_FILE, String::as_str);
    let mut settings = settings_loader::load(config)?;
    if matches.get_flag("verbose") {
        settings.verbose = true;
        settings_loader::finalize(&mut settings)?;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match load_settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&settings);

    match registry.execute(&matches, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
