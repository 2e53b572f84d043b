//! Configuration for opening a [`Repository`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use vb_process::{ProcessExecutor, DEFAULT_TIMEOUT};

use crate::error::{VcsError, VcsResult};
use crate::repo::Repository;
use crate::vcs_types::AdapterKind;

/// Repository location, adapter probe order and command timeout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Remote repository URL
    pub url: Option<String>,
    /// Local working copy directory
    pub directory: Option<PathBuf>,
    /// Adapter names in probe order (`git`, `svn`)
    pub adapters: Vec<String>,
    /// Per-command timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: None,
            directory: None,
            adapters: AdapterKind::ALL.iter().map(ToString::to_string).collect(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl RepositoryConfig {
    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> VcsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Configured adapters in order. Unknown names are skipped.
    pub fn adapter_kinds(&self) -> Vec<AdapterKind> {
        self.adapters
            .iter()
            .filter_map(|name| match name.parse::<AdapterKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    warn!("Skipping adapter: {}", e);
                    None
                }
            })
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a [`Repository`] backed by a [`ProcessExecutor`] with the configured timeout.
    pub fn open(&self) -> VcsResult<Repository> {
        let url = self
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| VcsError::config("repository URL is required"))?;
        let directory = self
            .directory
            .clone()
            .ok_or_else(|| VcsError::config("local directory is required"))?;
        if self.timeout_secs == 0 {
            return Err(VcsError::config("timeout must be at least one second"));
        }

        let runner = Arc::new(ProcessExecutor::with_timeout(self.timeout()));
        Ok(Repository::new(url, directory, runner).with_adapters(self.adapter_kinds()))
    }
}
