//! Git command execution and repository synchronization
//!
//! The resource never links against a git library. Every git operation is a
//! command string handed to a [CommandRunner], which keeps the sync logic
//! testable against a scripted runner and lets credentials travel as
//! per-operation environment overrides.
//!
//! - [shell::ShellRunner]: runs commands through `sh -c`
//! - [mock::ScriptedRunner]: in-memory runner for tests
//! - [sync::RepositorySync]: clone/fetch/reset and publish-with-retry on top of a runner

pub mod mock;
pub mod shell;
pub mod sync;

pub use mock::ScriptedRunner;
pub use shell::ShellRunner;
pub use sync::{RepositorySync, RetryPolicy, Workspace};

use thiserror::Error;

/// A command that could not be run or exited unsuccessfully
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{command}` failed: {message}")]
pub struct CommandError {
    /// The command text as handed to the runner
    pub command: String,
    /// Short reason, e.g. the exit status
    pub message: String,
    /// Everything the command printed (stdout followed by stderr)
    pub output: String,
}

impl CommandError {
    pub fn new(
        command: impl Into<String>,
        message: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        CommandError {
            command: command.into(),
            message: message.into(),
            output: output.into(),
        }
    }
}

/// Capability to execute a command line with environment overrides
///
/// ## Thread Safety
///
/// Implementors must be `Send + Sync`; runners are cloned into every
/// [RepositorySync] of an operation and may share state.
pub trait CommandRunner: Send + Sync {
    /// Set an environment variable for every command run afterwards
    fn set_env(&mut self, key: &str, value: &str);

    /// Run `command` to completion
    ///
    /// # Returns
    /// * `Ok(String)` - Captured output of a successful command
    /// * `Err(CommandError)` - If the command could not start or exited non-zero
    fn run(&self, command: &str) -> Result<String, CommandError>;
}

/// Quote a single argument for interpolation into a command line
pub(crate) fn quote(arg: &str) -> String {
    shell_words::quote(arg).into_owned()
}
