//! Tokio-backed [`CommandRunner`] that runs commands through `sh -c`.
//!
//! Each command leads its own process group, so a timeout takes down
//! everything the shell started and not just the shell itself.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{CommandOutcome, CommandRunner, Error, Result};

/// Upper bound on a single command; VCS network operations must not hang.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs shell commands as child processes and remembers the last outcome.
#[derive(Debug)]
pub struct ProcessExecutor {
    timeout: Duration,
    last_result: Mutex<Option<CommandOutcome>>,
}

impl ProcessExecutor {
    /// Create an executor with the default five minute timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create an executor that kills commands, including any processes they
    /// started, once they run longer than `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            last_result: Mutex::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Directory commands run in when the caller does not supply one.
    pub fn working_directory(&self) -> Result<PathBuf> {
        Ok(std::env::current_dir()?)
    }

    async fn run(
        &self,
        command: &str,
        working_directory: &Path,
        env: Option<&HashMap<String, String>>,
    ) -> Result<CommandOutcome> {
        let mut process = shell_command(command);
        process
            .current_dir(working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(env) = env {
            process.envs(env);
        }

        let child = process.spawn().map_err(|e| Error::spawn(command, e))?;
        let process_group = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                if let Some(pid) = process_group {
                    kill_process_group(pid);
                }
                return Err(Error::timeout(command, self.timeout));
            }
        };

        Ok(CommandOutcome::new(
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        ))
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ProcessExecutor {
    async fn execute(
        &self,
        command: &str,
        working_directory: Option<&Path>,
        env: Option<&HashMap<String, String>>,
    ) -> CommandOutcome {
        let result = match working_directory {
            Some(dir) => self.run(command, dir, env).await,
            None => match self.working_directory() {
                Ok(dir) => self.run(command, &dir, env).await,
                Err(e) => Err(e),
            },
        };

        let outcome = result.unwrap_or_else(|e| {
            warn!("Command did not complete: {}", e);
            CommandOutcome::new(-1, "", e.to_string())
        });
        debug!(
            command,
            exit_code = outcome.exit_code(),
            "Executed command"
        );

        *self
            .last_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        outcome
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn last_result(&self) -> Option<CommandOutcome> {
        self.last_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn shell_command(command: &str) -> Command {
    let mut process = Command::new("sh");
    process.arg("-c").arg(command).process_group(0);
    process
}

fn kill_process_group(pid: u32) {
    let Ok(pid) = i32::try_from(pid) else {
        return;
    };

    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        debug!(pid, "Process group already gone: {}", e);
    }
}
