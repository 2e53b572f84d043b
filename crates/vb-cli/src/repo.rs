use anyhow::{bail, Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;
use vb_repo::{Repository, RepositoryConfig, RevisionMap};

/// Repository location and backend selection, shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Read settings from a JSON configuration file
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remote repository URL
    #[arg(long = "url", value_name = "URL")]
    pub url: Option<String>,

    /// Local working copy directory
    #[arg(long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Adapter to probe, in order (git, svn); may be repeated
    #[arg(long = "adapter", value_name = "NAME")]
    pub adapters: Vec<String>,

    /// Per-command timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl RepoArgs {
    /// Configuration file values with command-line flags applied on top.
    pub fn config(&self) -> Result<RepositoryConfig> {
        let mut config = match &self.config {
            Some(path) => RepositoryConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => RepositoryConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = Some(url.clone());
        }
        if let Some(dir) = &self.dir {
            config.directory = Some(dir.clone());
        }
        if !self.adapters.is_empty() {
            config.adapters = self.adapters.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        Ok(config)
    }

    pub fn open(&self) -> Result<Repository> {
        let config = self.config()?;
        config.open().context("Invalid repository settings")
    }

    pub async fn detect(self) -> Result<()> {
        let mut repo = self.open()?;
        let adapter = repo.adapter().await?;
        println!("{}", adapter.kind());
        Ok(())
    }
}

/// Arguments for listing branches or tags
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Print the listing as a JSON object keyed by revision
    #[arg(long = "json")]
    pub json: bool,
}

impl ListArgs {
    pub async fn branches(self) -> Result<()> {
        let mut repo = self.repo.open()?;
        let branches = repo.branches().await?;
        println!("{}", format_listing(&branches, self.json)?);
        Ok(())
    }

    pub async fn tags(self) -> Result<()> {
        let mut repo = self.repo.open()?;
        let tags = repo.tags().await?;
        println!("{}", format_listing(&tags, self.json)?);
        Ok(())
    }
}

/// Arguments for checking out a version
#[derive(Args, Debug, Clone)]
pub struct CheckoutArgs {
    /// Branch or tag to check out (`master` selects the Subversion trunk)
    #[arg(value_name = "VERSION")]
    pub version: String,

    #[command(flatten)]
    pub repo: RepoArgs,
}

impl CheckoutArgs {
    pub async fn run(self) -> Result<()> {
        let mut repo = self.repo.open()?;
        if !repo.checkout(&self.version).await? {
            bail!(
                "Failed to check out \"{}\" into {}",
                self.version,
                repo.local_directory().display()
            );
        }
        println!(
            "Checked out {} into {}",
            self.version,
            repo.local_directory().display()
        );
        Ok(())
    }
}

/// Render a listing as `<revision>\t<label>` lines sorted by label, or as JSON.
pub fn format_listing(revisions: &RevisionMap, json: bool) -> Result<String> {
    if json {
        let sorted: BTreeMap<&String, &String> = revisions.iter().collect();
        return Ok(serde_json::to_string_pretty(&sorted)?);
    }

    let mut entries: Vec<(&String, &String)> = revisions.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));

    Ok(entries
        .iter()
        .map(|(revision, label)| format!("{}\t{}", revision, label))
        .collect::<Vec<_>>()
        .join("\n"))
}
