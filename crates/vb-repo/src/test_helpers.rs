//! Git repository fixtures for integration testing.
//!
//! Builds a local repository with a bare remote so adapters can be exercised
//! against real `git` without any network access. The bare remote's path is
//! used as the repository URL.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

/// Check if git is available on the system.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Configuration options for git repository creation.
#[derive(Debug, Clone)]
pub struct GitRepoConfig {
    /// Git user email (default: "test@example.com")
    pub user_email: String,
    /// Git user name (default: "Test User")
    pub user_name: String,
    /// Name of the initial branch (default: "main")
    pub initial_branch: String,
}

impl GitRepoConfig {
    /// Create a new GitRepoConfig with default values, allowing fluent configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vb_repo::test_helpers::GitRepoConfig;
    ///
    /// let config = GitRepoConfig::new().initial_branch("trunk");
    /// assert_eq!(config.initial_branch, "trunk");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial branch name.
    pub fn initial_branch(mut self, branch: impl Into<String>) -> Self {
        self.initial_branch = branch.into();
        self
    }
}

impl Default for GitRepoConfig {
    fn default() -> Self {
        Self {
            user_email: "test@example.com".to_string(),
            user_name: "Test User".to_string(),
            initial_branch: "main".to_string(),
        }
    }
}

/// A Git test repository with local and remote setup.
pub struct GitTestRepo {
    /// Temporary directory containing the local repository
    pub local_repo: TempDir,
    /// Temporary directory containing the bare remote repository
    pub remote_repo: TempDir,
    /// Path to the local repository
    pub local_path: PathBuf,
    /// Path to the remote repository
    pub remote_path: PathBuf,
}

impl GitTestRepo {
    /// The remote's location, usable as a repository URL.
    pub fn url(&self) -> String {
        self.remote_path.to_string_lossy().into_owned()
    }
}

/// Create a local repository with one pushed commit and a bare `origin` remote.
pub async fn create_git_repo_with_remote(
    config: Option<GitRepoConfig>,
) -> Result<GitTestRepo, Box<dyn std::error::Error>> {
    let config = config.unwrap_or_default();
    let remote_repo = TempDir::new()?;
    let local_repo = TempDir::new()?;

    let remote_path = remote_repo.path().to_path_buf();
    let local_path = local_repo.path().to_path_buf();

    git(&remote_path, &["init", "--bare", "-b", &config.initial_branch]).await?;
    git(&local_path, &["init", "-b", &config.initial_branch]).await?;
    git(&local_path, &["config", "user.email", &config.user_email]).await?;
    git(&local_path, &["config", "user.name", &config.user_name]).await?;
    git(&local_path, &["config", "commit.gpgsign", "false"]).await?;
    git(&local_path, &["config", "tag.gpgsign", "false"]).await?;
    git(
        &local_path,
        &["remote", "add", "origin", &remote_path.to_string_lossy()],
    )
    .await?;

    create_commit(&local_path, "README.md", "Initial content", "Initial commit").await?;
    push_to_remote(&local_path, &config.initial_branch).await?;

    Ok(GitTestRepo {
        local_repo,
        remote_repo,
        local_path,
        remote_path,
    })
}

/// Create a commit in an existing git repository and return its hash.
pub async fn create_commit(
    repo_path: &Path,
    filename: &str,
    content: &str,
    message: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    tokio::fs::write(repo_path.join(filename), content).await?;
    git(repo_path, &["add", filename]).await?;
    git(repo_path, &["commit", "-m", message]).await?;
    rev_parse(repo_path, "HEAD").await
}

/// Create and switch to a new branch.
pub async fn create_branch(repo_path: &Path, branch: &str) -> Result<(), Box<dyn std::error::Error>> {
    git(repo_path, &["checkout", "-b", branch]).await?;
    Ok(())
}

/// Switch to an existing branch.
pub async fn switch_branch(repo_path: &Path, branch: &str) -> Result<(), Box<dyn std::error::Error>> {
    git(repo_path, &["checkout", branch]).await?;
    Ok(())
}

/// Create an annotated tag on HEAD.
pub async fn create_annotated_tag(
    repo_path: &Path,
    tag: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    git(repo_path, &["tag", "-a", tag, "-m", &format!("Release {}", tag)]).await?;
    Ok(())
}

/// Create a lightweight tag on HEAD.
pub async fn create_lightweight_tag(
    repo_path: &Path,
    tag: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    git(repo_path, &["tag", tag]).await?;
    Ok(())
}

/// Push a branch or tag to `origin`.
pub async fn push_to_remote(
    repo_path: &Path,
    refspec: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    git(repo_path, &["push", "origin", refspec]).await?;
    Ok(())
}

/// Resolve a revision to its commit hash.
pub async fn rev_parse(repo_path: &Path, rev: &str) -> Result<String, Box<dyn std::error::Error>> {
    let output = git(repo_path, &["rev-parse", &format!("{}^{{commit}}", rev)]).await?;
    Ok(output.trim().to_string())
}

/// Output of `git branch` in a working copy.
pub async fn branch_listing(repo_path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    git(repo_path, &["branch"]).await
}

async fn git(repo_path: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git {} failed: {}", args.join(" "), stderr).into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
