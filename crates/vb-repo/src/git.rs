//! Git backend driven through the `git` command-line client.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use vb_process::{escape_argument, CommandOutcome, CommandRunner};

use crate::adapter::VcsAdapter;
use crate::vcs_types::{RepositoryRef, RevisionMap};

lazy_static! {
    static ref GIT_URL: Regex =
        Regex::new(r"(?i)(^git://|\.git$|git(?:olite)?@|//git\.|//github\.com/)")
            .expect("git url pattern");
    static ref HEAD_REF: Regex =
        Regex::new(r"^([a-f0-9]{40})\s+refs/heads/(\S+)$").expect("head ref pattern");
    static ref PEELED_TAG_REF: Regex =
        Regex::new(r"^([a-f0-9]{40})\s+refs/tags/(\S+)\^\{\}$").expect("tag ref pattern");
    static ref DETACHED_HEAD: Regex =
        Regex::new(r"(?m)^\s*\*.*(?:no branch|HEAD detached at)").expect("detached head pattern");
}

/// Environment that makes git fail instead of prompting for credentials.
const NON_INTERACTIVE_ENV: [(&str, &str); 2] =
    [("GIT_TERMINAL_PROMPT", "0"), ("GIT_ASKPASS", "echo")];

/// Whether `url` has one of the shapes Git repositories are commonly published under.
pub fn looks_like_git_url(url: &str) -> bool {
    GIT_URL.is_match(url)
}

/// Parse `git ls-remote --heads` output into commit hash → branch name.
pub fn parse_heads(output: &str) -> RevisionMap {
    parse_refs(output, &HEAD_REF)
}

/// Parse `git ls-remote --tags` output into commit hash → tag name.
///
/// Only the peeled `^{}` lines of annotated tags are kept; lightweight tags are
/// skipped.
pub fn parse_tags(output: &str) -> RevisionMap {
    parse_refs(output, &PEELED_TAG_REF)
}

/// Whether `git branch` output marks the current checkout as a detached HEAD.
pub fn is_detached_head(branch_output: &str) -> bool {
    DETACHED_HEAD.is_match(branch_output)
}

fn parse_refs(output: &str, pattern: &Regex) -> RevisionMap {
    output
        .lines()
        .filter_map(|line| pattern.captures(line.trim_end()))
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct GitAdapter {
    repository: RepositoryRef,
    runner: Arc<dyn CommandRunner>,
    env: HashMap<String, String>,
}

impl GitAdapter {
    pub fn new(repository: RepositoryRef, runner: Arc<dyn CommandRunner>) -> Self {
        let env = NON_INTERACTIVE_ENV
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self {
            repository,
            runner,
            env,
        }
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    async fn git(&self, command: &str, working_directory: Option<&Path>) -> CommandOutcome {
        self.runner
            .execute(command, working_directory, Some(&self.env))
            .await
    }

    async fn ls_remote(&self, kind: &str) -> CommandOutcome {
        let command = format!(
            "git ls-remote --{} {}",
            kind,
            escape_argument(self.repository.url())
        );
        self.git(&command, None).await
    }

    async fn is_work_tree(&self) -> bool {
        let directory = self.repository.local_directory();
        self.runner.is_directory(directory)
            && self
                .git("git rev-parse --is-inside-work-tree", Some(directory))
                .await
                .succeeded()
    }

    /// Fetch, check out `version` and fast-forward it unless it is a detached HEAD.
    async fn update_work_tree(&self, version: &str) -> bool {
        let directory = self.repository.local_directory();
        let commands = [
            "git fetch".to_string(),
            format!("git checkout {}", escape_argument(version)),
        ];

        for command in &commands {
            if !self.git(command, Some(directory)).await.succeeded() {
                return false;
            }
        }

        let branch = self.git("git branch", Some(directory)).await;
        if !branch.succeeded() {
            return false;
        }

        if is_detached_head(branch.stdout()) {
            debug!(version, "Detached HEAD after checkout, skipping pull");
            return true;
        }

        self.git("git pull", Some(directory)).await.succeeded()
    }

    async fn clone_version(&self, version: &str) -> bool {
        let command = format!(
            "git clone -b {} --single-branch {} {}",
            escape_argument(version),
            escape_argument(self.repository.url()),
            escape_argument(&self.repository.local_directory().to_string_lossy())
        );
        self.git(&command, None).await.succeeded()
    }
}

#[async_trait]
impl VcsAdapter for GitAdapter {
    async fn supports_repository(&self) -> bool {
        if !self.runner.execute("git --version", None, None).await.succeeded() {
            debug!("git client not available");
            return false;
        }

        if looks_like_git_url(self.repository.url()) {
            return true;
        }

        self.ls_remote("heads").await.succeeded()
    }

    async fn branches(&self) -> RevisionMap {
        let outcome = self.ls_remote("heads").await;
        if !outcome.succeeded() {
            return RevisionMap::new();
        }

        parse_heads(outcome.stdout())
    }

    async fn tags(&self) -> RevisionMap {
        let outcome = self.ls_remote("tags").await;
        if !outcome.succeeded() {
            return RevisionMap::new();
        }

        parse_tags(outcome.stdout())
    }

    async fn checkout(&self, version: &str) -> bool {
        if self.is_work_tree().await {
            self.update_work_tree(version).await
        } else {
            self.clone_version(version).await
        }
    }
}
