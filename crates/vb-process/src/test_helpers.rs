//! Scripted [`CommandRunner`] for exercising adapters without subprocesses.
//!
//! Outcomes are queued up front and handed out in order, one per executed
//! command. Every invocation is recorded so tests can assert the exact command
//! sequence an adapter issued.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{CommandOutcome, CommandRunner};

/// Exit code reported when a command runs after the script is exhausted.
pub const UNSCRIPTED_EXIT_CODE: i32 = 127;

/// One recorded call to [`CommandRunner::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub working_directory: Option<PathBuf>,
    pub env: Option<HashMap<String, String>>,
}

/// A runner that replays queued outcomes and records what it was asked to do.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    outcomes: Mutex<VecDeque<CommandOutcome>>,
    directories: Mutex<HashSet<PathBuf>>,
    invocations: Mutex<Vec<Invocation>>,
    directory_checks: Mutex<Vec<PathBuf>>,
    last_result: Mutex<Option<CommandOutcome>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next unanswered command.
    pub fn respond(mut self, outcome: CommandOutcome) -> Self {
        self.outcomes
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    /// Queue a successful outcome with the given standard output.
    pub fn succeed(self, stdout: &str) -> Self {
        self.respond(CommandOutcome::success(stdout))
    }

    /// Queue a failed outcome.
    pub fn fail(self) -> Self {
        self.respond(CommandOutcome::failure())
    }

    /// Report `path` as an existing directory.
    pub fn with_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.directories
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into());
        self
    }

    /// Every command executed so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.invocations).clone()
    }

    /// Command strings executed so far, in order.
    pub fn commands(&self) -> Vec<String> {
        lock(&self.invocations)
            .iter()
            .map(|invocation| invocation.command.clone())
            .collect()
    }

    /// Paths passed to [`CommandRunner::is_directory`], in order.
    pub fn directory_checks(&self) -> Vec<PathBuf> {
        lock(&self.directory_checks).clone()
    }

    /// Number of queued outcomes not consumed yet.
    pub fn remaining(&self) -> usize {
        lock(&self.outcomes).len()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(
        &self,
        command: &str,
        working_directory: Option<&Path>,
        env: Option<&HashMap<String, String>>,
    ) -> CommandOutcome {
        lock(&self.invocations).push(Invocation {
            command: command.to_string(),
            working_directory: working_directory.map(Path::to_path_buf),
            env: env.cloned(),
        });

        let outcome = lock(&self.outcomes).pop_front().unwrap_or_else(|| {
            CommandOutcome::new(
                UNSCRIPTED_EXIT_CODE,
                "",
                format!("no scripted outcome for: {}", command),
            )
        });
        *lock(&self.last_result) = Some(outcome.clone());
        outcome
    }

    fn is_directory(&self, path: &Path) -> bool {
        lock(&self.directory_checks).push(path.to_path_buf());
        lock(&self.directories).contains(path)
    }

    fn last_result(&self) -> Option<CommandOutcome> {
        lock(&self.last_result).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
