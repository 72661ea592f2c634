//! Built-in management commands.
//!
//! Each command implements the
//! [`ManagementCommand`](crate::command::ManagementCommand) trait.

pub mod create;
pub mod down;
pub mod exec;
pub mod init;
pub mod show;
pub mod skip;
pub mod status;
pub mod up;

pub use create::CreateCommand;
pub use down::DownCommand;
pub use exec::ExecCommand;
pub use init::InitCommand;
pub use show::ShowCommand;
pub use skip::SkipCommand;
pub use status::StatusCommand;
pub use up::UpCommand;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(InitCommand));
    registry.register(Box::new(CreateCommand));
    registry.register(Box::new(UpCommand));
    registry.register(Box::new(DownCommand));
    registry.register(Box::new(StatusCommand));
    registry.register(Box::new(SkipCommand));
    registry.register(Box::new(ShowCommand));
    registry.register(Box::new(ExecCommand));
}
