//! Subversion backend using the conventional trunk/branches/tags layout.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use vb_process::{escape_argument, CommandOutcome, CommandRunner};

use crate::adapter::VcsAdapter;
use crate::vcs_types::{RepositoryRef, RevisionMap};

const TRUNK_PATH: &str = "trunk";
const BRANCHES_PATH: &str = "branches";
const TAGS_PATH: &str = "tags";

/// Label the trunk is listed under, matching Git's conventional default branch.
pub const TRUNK_LABEL: &str = "master";

/// Name `svn ls` gives the listed directory itself.
const SELF_ENTRY: &str = "./";

lazy_static! {
    static ref SVN_URL: Regex =
        Regex::new(r"(?i)(^svn://|^svn\+ssh://|svn\.)").expect("svn url pattern");
}

/// Whether `url` has one of the shapes Subversion repositories are commonly published under.
pub fn looks_like_svn_url(url: &str) -> bool {
    SVN_URL.is_match(url)
}

/// Parse one `svn ls` line into its revision and entry name.
///
/// The revision is the first column and must be numeric; the entry name is the
/// last column. Directory names lose their trailing slash, except for the
/// `./` self entry.
pub fn parse_listing_line(line: &str) -> Option<(String, String)> {
    let mut columns = line.split_whitespace();
    let revision = columns.next()?;
    let name = columns.last()?;

    if !revision.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let name = if name == SELF_ENTRY {
        name
    } else {
        name.trim_end_matches('/')
    };
    if name.is_empty() {
        return None;
    }

    Some((revision.to_string(), name.to_string()))
}

/// Parse a `trunk` listing: the self entry stands for the trunk itself.
pub fn parse_trunk_listing(output: &str) -> RevisionMap {
    output
        .lines()
        .filter_map(parse_listing_line)
        .filter(|(_, name)| name == SELF_ENTRY)
        .map(|(revision, _)| (revision, TRUNK_LABEL.to_string()))
        .collect()
}

/// Parse a `branches` or `tags` listing into revision → entry name.
pub fn parse_entry_listing(output: &str) -> RevisionMap {
    output
        .lines()
        .filter_map(parse_listing_line)
        .filter(|(_, name)| name != SELF_ENTRY)
        .collect()
}

#[derive(Debug, Clone)]
pub struct SubversionAdapter {
    repository: RepositoryRef,
    runner: Arc<dyn CommandRunner>,
}

impl SubversionAdapter {
    pub fn new(repository: RepositoryRef, runner: Arc<dyn CommandRunner>) -> Self {
        Self { repository, runner }
    }

    pub fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.repository.url().trim_end_matches('/'), path)
    }

    async fn svn(&self, command: &str, working_directory: Option<&Path>) -> CommandOutcome {
        self.runner.execute(command, working_directory, None).await
    }

    async fn list(&self, path: &str) -> Option<String> {
        let command = format!(
            "svn ls --non-interactive {}",
            escape_argument(&self.url_for(path))
        );
        let outcome = self.svn(&command, None).await;
        if !outcome.succeeded() {
            debug!(path, "svn listing failed");
            return None;
        }

        debug!(path, entries = outcome.output_lines().count(), "Listed svn directory");
        Some(outcome.stdout().to_string())
    }

    /// Repository URL `version` lives at, looked up as trunk, then branch, then tag.
    pub async fn version_url(&self, version: &str) -> Option<String> {
        if version == TRUNK_LABEL || version == TRUNK_PATH {
            return Some(self.url_for(TRUNK_PATH));
        }

        if self.branches().await.values().any(|name| name == version) {
            return Some(self.url_for(&format!("{}/{}", BRANCHES_PATH, version)));
        }

        if self.tags().await.values().any(|name| name == version) {
            return Some(self.url_for(&format!("{}/{}", TAGS_PATH, version)));
        }

        None
    }

    async fn is_working_copy(&self) -> bool {
        let directory = self.repository.local_directory();
        self.runner.is_directory(directory)
            && self
                .svn("svn info --non-interactive", Some(directory))
                .await
                .succeeded()
    }
}

#[async_trait]
impl VcsAdapter for SubversionAdapter {
    async fn supports_repository(&self) -> bool {
        if !self.svn("svn --version", None).await.succeeded() {
            debug!("svn client not available");
            return false;
        }

        if looks_like_svn_url(self.repository.url()) {
            return true;
        }

        let command = format!(
            "svn info --non-interactive {}",
            escape_argument(self.repository.url())
        );
        self.svn(&command, None).await.succeeded()
    }

    async fn branches(&self) -> RevisionMap {
        let mut branches = RevisionMap::new();

        if let Some(output) = self.list(TRUNK_PATH).await {
            branches.extend(parse_trunk_listing(&output));
        }

        if let Some(output) = self.list(BRANCHES_PATH).await {
            branches.extend(parse_entry_listing(&output));
        }

        branches
    }

    async fn tags(&self) -> RevisionMap {
        self.list(TAGS_PATH)
            .await
            .map(|output| parse_entry_listing(&output))
            .unwrap_or_default()
    }

    async fn checkout(&self, version: &str) -> bool {
        let Some(url) = self.version_url(version).await else {
            debug!(version, "Version not found on trunk, branches or tags");
            return false;
        };
        let url = escape_argument(&url);

        if self.is_working_copy().await {
            let command = format!("svn switch --non-interactive {}", url);
            return self
                .svn(&command, Some(self.repository.local_directory()))
                .await
                .succeeded();
        }

        let command = format!(
            "svn checkout --non-interactive {} {}",
            url,
            escape_argument(&self.repository.local_directory().to_string_lossy())
        );
        self.svn(&command, None).await.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vb_process::test_helpers::ScriptedRunner;

    const URL: &str = "https://github.com/accompli/chrono";
    const WORK_DIR: &str = "/svn/working-directory";

    const TRUNK_LISTING: &str = "     34 niels.ni              nov 22 22:10 ./\n     34 niels.ni              nov 22 22:10 file\n";
    const BRANCHES_LISTING: &str = "     35 niels.ni              nov 22 22:10 ./\n     35 niels.ni              nov 22 22:10 1.0/\n";
    const TAGS_LISTING: &str = "     36 niels.ni              nov 22 22:10 ./\n     35 niels.ni              nov 22 22:10 0.1.0/\n";

    fn adapter(url: &str, runner: &Arc<ScriptedRunner>) -> SubversionAdapter {
        SubversionAdapter::new(RepositoryRef::new(url, WORK_DIR), runner.clone())
    }

    fn ls_command(path: &str) -> String {
        format!(
            "svn ls --non-interactive {}",
            escape_argument(&format!("{}/{}", URL, path))
        )
    }

    fn switch_command(path: &str) -> String {
        format!(
            "svn switch --non-interactive {}",
            escape_argument(&format!("{}/{}", URL, path))
        )
    }

    #[test]
    fn url_shapes() {
        assert!(looks_like_svn_url("svn://example.com/repo"));
        assert!(looks_like_svn_url("svn+ssh://example.com/accompli/chrono"));
        assert!(looks_like_svn_url("https://svn.apache.org/repos/asf"));
        assert!(looks_like_svn_url("https://SVN.example.com/repo"));

        assert!(!looks_like_svn_url("https://github.com/accompli/chrono.git"));
        assert!(!looks_like_svn_url("git@github.com:accompli/chrono.git"));
        assert!(!looks_like_svn_url("user@example.com:accompli/chrono"));
    }

    #[test]
    fn listing_lines() {
        assert_eq!(
            parse_listing_line("     35 niels.ni              nov 22 22:10 1.0/"),
            Some(("35".to_string(), "1.0".to_string()))
        );
        assert_eq!(
            parse_listing_line("  1024 author  4096 Jan 01  2024 ./"),
            Some(("1024".to_string(), "./".to_string()))
        );
        assert_eq!(parse_listing_line("1.0/"), None);
        assert_eq!(parse_listing_line("r35 author 1.0/"), None);
        assert_eq!(parse_listing_line("   "), None);
    }

    #[test]
    fn trunk_self_entry_becomes_master() {
        let branches = parse_trunk_listing(TRUNK_LISTING);

        assert_eq!(
            branches,
            RevisionMap::from([("34".to_string(), TRUNK_LABEL.to_string())])
        );
    }

    #[test]
    fn entry_listing_skips_the_self_entry() {
        let tags = parse_entry_listing(TAGS_LISTING);

        assert_eq!(
            tags,
            RevisionMap::from([("35".to_string(), "0.1.0".to_string())])
        );
    }

    #[test]
    fn entry_listing_keeps_the_last_name_per_revision() {
        let output = "  40 a  nov 22 22:10 1.0/\n  40 a  nov 22 22:10 1.1/\n  41 a  nov 22 22:10 2.0/\n";

        let branches = parse_entry_listing(output);

        assert_eq!(branches.len(), 2);
        assert_eq!(branches["40"], "1.1");
        assert_eq!(branches["41"], "2.0");
    }

    #[tokio::test]
    async fn unsupported_without_svn_client() {
        let runner = Arc::new(ScriptedRunner::new().fail());

        assert!(!adapter("https://github.com/accompli/chrono.git", &runner)
            .supports_repository()
            .await);
        assert_eq!(runner.commands(), vec!["svn --version"]);
    }

    #[tokio::test]
    async fn known_url_shapes_skip_the_network_probe() {
        let runner = Arc::new(ScriptedRunner::new().succeed("svn, version 1.14.2"));

        assert!(adapter("svn+ssh://example.com/accompli/chrono", &runner)
            .supports_repository()
            .await);
        assert_eq!(runner.commands(), vec!["svn --version"]);
    }

    #[tokio::test]
    async fn unknown_url_shapes_fall_back_to_svn_info() {
        let url = "https://github.com/accompli/chrono.git";
        let runner = Arc::new(ScriptedRunner::new().succeed("").succeed(""));

        assert!(adapter(url, &runner).supports_repository().await);
        assert_eq!(
            runner.commands(),
            vec![
                "svn --version".to_string(),
                format!("svn info --non-interactive {}", escape_argument(url)),
            ]
        );

        let url = "git@github.com:accompli/chrono.git";
        let runner = Arc::new(ScriptedRunner::new().succeed("").fail());

        assert!(!adapter(url, &runner).supports_repository().await);
        assert_eq!(runner.commands().len(), 2);
    }

    #[tokio::test]
    async fn branches_merge_trunk_and_branches_listings() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .succeed(TRUNK_LISTING)
                .succeed(BRANCHES_LISTING),
        );

        let branches = adapter(URL, &runner).branches().await;

        assert_eq!(
            branches,
            RevisionMap::from([
                ("34".to_string(), "master".to_string()),
                ("35".to_string(), "1.0".to_string()),
            ])
        );
        assert_eq!(
            runner.commands(),
            vec![ls_command("trunk"), ls_command("branches")]
        );
    }

    #[tokio::test]
    async fn failed_trunk_listing_is_absorbed() {
        let runner = Arc::new(ScriptedRunner::new().fail().succeed(BRANCHES_LISTING));

        let branches = adapter(URL, &runner).branches().await;

        assert_eq!(
            branches,
            RevisionMap::from([("35".to_string(), "1.0".to_string())])
        );
    }

    #[tokio::test]
    async fn failed_listings_yield_empty_maps() {
        let runner = Arc::new(ScriptedRunner::new().fail().fail().fail());
        let svn = adapter(URL, &runner);

        assert!(svn.branches().await.is_empty());
        assert!(svn.tags().await.is_empty());
        assert_eq!(runner.commands().last().unwrap(), &ls_command("tags"));
    }

    #[tokio::test]
    async fn unresolvable_version_fails_without_touching_the_working_copy() {
        let runner = Arc::new(ScriptedRunner::new().fail().fail().fail());

        assert!(!adapter(URL, &runner).checkout("0.1.0").await);
        assert_eq!(
            runner.commands(),
            vec![ls_command("trunk"), ls_command("branches"), ls_command("tags")]
        );
        assert!(runner.directory_checks().is_empty());
    }

    #[tokio::test]
    async fn tag_is_checked_out_into_a_fresh_directory() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .succeed(TRUNK_LISTING)
                .succeed(BRANCHES_LISTING)
                .succeed(TAGS_LISTING)
                .succeed(""),
        );

        assert!(adapter(URL, &runner).checkout("0.1.0").await);
        assert_eq!(
            runner.commands(),
            vec![
                ls_command("trunk"),
                ls_command("branches"),
                ls_command("tags"),
                format!(
                    "svn checkout --non-interactive {} {}",
                    escape_argument(&format!("{}/tags/0.1.0", URL)),
                    escape_argument(WORK_DIR)
                ),
            ]
        );
    }

    #[tokio::test]
    async fn failed_checkout_is_reported() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .succeed(TRUNK_LISTING)
                .succeed(BRANCHES_LISTING)
                .succeed(TAGS_LISTING)
                .fail(),
        );

        assert!(!adapter(URL, &runner).checkout("0.1.0").await);
        assert_eq!(runner.commands().len(), 4);
    }

    #[tokio::test]
    async fn existing_working_copy_is_switched() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .with_directory(WORK_DIR)
                .succeed(TRUNK_LISTING)
                .succeed(BRANCHES_LISTING)
                .succeed(TAGS_LISTING)
                .succeed("")
                .succeed(""),
        );

        assert!(adapter(URL, &runner).checkout("0.1.0").await);
        assert_eq!(
            runner.commands(),
            vec![
                ls_command("trunk"),
                ls_command("branches"),
                ls_command("tags"),
                "svn info --non-interactive".to_string(),
                switch_command("tags/0.1.0"),
            ]
        );
        let invocations = runner.invocations();
        assert_eq!(invocations[3].working_directory, Some(PathBuf::from(WORK_DIR)));
        assert_eq!(invocations[4].working_directory, Some(PathBuf::from(WORK_DIR)));
    }

    #[tokio::test]
    async fn failed_switch_is_reported() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .with_directory(WORK_DIR)
                .succeed(TRUNK_LISTING)
                .succeed(BRANCHES_LISTING)
                .succeed(TAGS_LISTING)
                .succeed("")
                .fail(),
        );

        assert!(!adapter(URL, &runner).checkout("0.1.0").await);
        assert_eq!(runner.commands().last().unwrap(), &switch_command("tags/0.1.0"));
    }

    #[tokio::test]
    async fn master_and_trunk_resolve_without_listing() {
        for version in ["master", "trunk"] {
            let runner = Arc::new(
                ScriptedRunner::new()
                    .with_directory(WORK_DIR)
                    .succeed("")
                    .succeed(""),
            );

            assert!(adapter(URL, &runner).checkout(version).await);
            assert_eq!(
                runner.commands(),
                vec![
                    "svn info --non-interactive".to_string(),
                    switch_command("trunk"),
                ]
            );
        }
    }

    #[tokio::test]
    async fn branch_resolves_before_tags_are_listed() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .with_directory(WORK_DIR)
                .succeed(TRUNK_LISTING)
                .succeed(BRANCHES_LISTING)
                .succeed("")
                .succeed(""),
        );

        assert!(adapter(URL, &runner).checkout("1.0").await);
        assert_eq!(
            runner.commands(),
            vec![
                ls_command("trunk"),
                ls_command("branches"),
                "svn info --non-interactive".to_string(),
                switch_command("branches/1.0"),
            ]
        );
    }

    #[tokio::test]
    async fn branch_wins_over_tag_with_the_same_name() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .succeed(TRUNK_LISTING)
                .succeed("  50 a  nov 22 22:10 2.0/\n")
                .succeed("  51 a  nov 22 22:10 2.0/\n"),
        );

        let url = adapter(URL, &runner).version_url("2.0").await;

        assert_eq!(url, Some(format!("{}/branches/2.0", URL)));
        assert_eq!(runner.remaining(), 1);
    }

    #[tokio::test]
    async fn trunk_wins_over_branch_named_trunk() {
        let runner = Arc::new(ScriptedRunner::new().succeed("  50 a  nov 22 22:10 trunk/\n"));

        let url = adapter(URL, &runner).version_url("trunk").await;

        assert_eq!(url, Some(format!("{}/trunk", URL)));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn trailing_slash_in_repository_url_is_not_doubled() {
        let runner = Arc::new(ScriptedRunner::new());

        let url = adapter("svn://example.com/repo/", &runner)
            .version_url("master")
            .await;

        assert_eq!(url, Some("svn://example.com/repo/trunk".to_string()));
    }
}
