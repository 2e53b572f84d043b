//! Command execution seam for the version-control adapters.
//!
//! Adapters never spawn processes themselves. They hand a fully escaped shell
//! command string to a [`CommandRunner`] and inspect the [`CommandOutcome`]
//! that comes back, which keeps the adapters testable against scripted
//! output (see [`test_helpers::ScriptedRunner`]).
//!
//! Commands run through a POSIX `sh` and arguments are quoted for it with
//! [`escape_argument`], so only unix targets are supported.

#[cfg(not(unix))]
compile_error!("vb-process runs commands through a POSIX shell and supports unix targets only");

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;

pub mod error;
pub mod executor;
pub mod outcome;
pub mod test_helpers;

/// Result type for process execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for process execution.
pub use error::Error;

/// Default tokio-backed runner.
pub use executor::{ProcessExecutor, DEFAULT_TIMEOUT};

/// Exit code and captured output of one command.
pub use outcome::CommandOutcome;

/// Executes shell command strings on behalf of an adapter.
#[async_trait]
pub trait CommandRunner: Debug + Send + Sync {
    /// Run `command` through `sh -c`.
    ///
    /// `working_directory` defaults to the current directory of the process and
    /// `env` entries are layered over the inherited environment. Failures to
    /// spawn or complete the command are reported as an unsuccessful outcome.
    async fn execute(
        &self,
        command: &str,
        working_directory: Option<&Path>,
        env: Option<&HashMap<String, String>>,
    ) -> CommandOutcome;

    /// Whether `path` exists and is a directory.
    fn is_directory(&self, path: &Path) -> bool;

    /// Outcome of the most recently executed command, if any.
    fn last_result(&self) -> Option<CommandOutcome>;
}

/// Quote a single argument for interpolation into an `sh` command string.
pub fn escape_argument(argument: &str) -> String {
    shell_words::quote(argument).into_owned()
}
